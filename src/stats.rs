//! Statistics & Reporter (spec.md §2, §7): the six counters and the
//! end-of-call summary lines, each emitted only when its counter is
//! non-zero, in the order spec.md §7 specifies.

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub new: u64,
    pub updated: u64,
    pub equal: u64,
    pub skipped: u64,
    pub symlinks_skipped: u64,
    pub errors: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit the summary lines, in the fixed order spec.md §7 specifies,
    /// skipping any counter that is zero.
    pub fn log_summary(&self) {
        if self.new > 0 {
            tracing::info!("Added {} new file(s).", self.new);
        }
        if self.updated > 0 {
            tracing::info!("Updated {} file(s).", self.updated);
        }
        if self.equal > 0 {
            tracing::info!("Reindexed {} file(s) which were already indexed and equal.", self.equal);
        }
        if self.skipped > 0 {
            tracing::info!("Skipped {} already indexed file(s).", self.skipped);
        }
        if self.symlinks_skipped > 0 {
            tracing::info!("Skipped {} symlink(s).", self.symlinks_skipped);
        }
        if self.errors > 0 {
            tracing::warn!("Encountered {} indexing error(s).", self.errors);
        }
    }
}
