use super::aggregate::ZeroDurationPolicy;
use chrono::FixedOffset;

/// Run-wide switches handed down to the import and export commands.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Perform all reads but no writes.
    pub dry_run: bool,
    /// Fail instead of prompting.
    pub headless: bool,
    /// Local UTC offset captured at start-up.
    pub offset: FixedOffset,
    pub zero_duration: ZeroDurationPolicy,
}
