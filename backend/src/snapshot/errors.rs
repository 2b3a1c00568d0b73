use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Any failure other than "no record": the previous state is unknown.
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    /// The record changed between read and write.
    #[error("snapshot was modified concurrently (expected version {expected:?})")]
    Conflict { expected: Option<i64> },
}
