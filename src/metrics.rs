use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing gateway activity.
#[derive(Default)]
pub struct GatewayMetrics {
    documents_uploaded: AtomicU64,
    documents_processed: AtomicU64,
    documents_failed: AtomicU64,
    queries_answered: AtomicU64,
}

impl GatewayMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted upload.
    pub fn record_upload(&self) {
        self.documents_uploaded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a document that completed background processing.
    pub fn record_processed(&self) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a document whose background processing failed.
    pub fn record_failed(&self) {
        self.documents_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successfully answered query.
    pub fn record_query(&self) {
        self.queries_answered.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_uploaded: self.documents_uploaded.load(Ordering::Relaxed),
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            documents_failed: self.documents_failed.load(Ordering::Relaxed),
            queries_answered: self.queries_answered.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of gateway counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of uploads accepted since startup.
    pub documents_uploaded: u64,
    /// Number of documents that reached the `processed` state.
    pub documents_processed: u64,
    /// Number of documents that reached the `failed` state.
    pub documents_failed: u64,
    /// Number of queries answered successfully.
    pub queries_answered: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_lifecycle_counters() {
        let metrics = GatewayMetrics::new();
        metrics.record_upload();
        metrics.record_upload();
        metrics.record_processed();
        metrics.record_failed();
        metrics.record_query();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_uploaded, 2);
        assert_eq!(snapshot.documents_processed, 1);
        assert_eq!(snapshot.documents_failed, 1);
        assert_eq!(snapshot.queries_answered, 1);
    }

    #[test]
    fn snapshot_starts_at_zero() {
        let metrics = GatewayMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_uploaded, 0);
        assert_eq!(snapshot.queries_answered, 0);
    }
}
