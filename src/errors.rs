use std::fmt;

/// Fatal pass-level errors. Everything per-record or per-page degrades to
/// skip-and-continue and is tallied in the [`PassSummary`] instead; only a
/// failure to even start a pass reaches the external scheduler.
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Outcome of processing one record within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Created,
    Updated,
    Skipped,
    Failed,
}

/// Per-pass counters, logged once at pass end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
    pub failed: u32,
    /// Reconciler: rows merged into an existing row at the new address.
    pub merged: u32,
    /// Reconciler: rows whose address was rewritten in place.
    pub migrated: u32,
    /// Reconciler: stored traders with no matching source record this pass.
    pub unseen: u32,
}

impl PassSummary {
    pub fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Created => self.created += 1,
            RecordOutcome::Updated => self.updated += 1,
            RecordOutcome::Skipped => self.skipped += 1,
            RecordOutcome::Failed => self.failed += 1,
        }
    }

    pub fn total_processed(&self) -> u32 {
        self.created + self.updated + self.skipped + self.failed
    }
}

impl fmt::Display for PassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={} updated={} skipped={} failed={} merged={} migrated={} unseen={}",
            self.created,
            self.updated,
            self.skipped,
            self.failed,
            self.merged,
            self.migrated,
            self.unseen,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut s = PassSummary::default();
        s.record(RecordOutcome::Created);
        s.record(RecordOutcome::Created);
        s.record(RecordOutcome::Updated);
        s.record(RecordOutcome::Failed);
        assert_eq!(s.created, 2);
        assert_eq!(s.updated, 1);
        assert_eq!(s.failed, 1);
        assert_eq!(s.total_processed(), 4);
    }
}
