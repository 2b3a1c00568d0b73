use market::Snapshot;

/// Fixed row key of the single snapshot record.
pub const ROW_KEY: &str = "1";

/// The persisted snapshot together with its concurrency version.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredSnapshot {
    /// Incremented on every write; a write must name the version it read.
    pub version: i64,

    /// `None` when the row exists but its columns could not be decoded.
    pub snapshot: Option<Snapshot>,

    pub updated_ms: i64,
}
