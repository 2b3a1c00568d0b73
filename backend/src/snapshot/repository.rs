use async_trait::async_trait;
use market::Snapshot;

use crate::snapshot::errors::StoreError;
use crate::snapshot::model::StoredSnapshot;

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// `Ok(None)` means no record exists yet.
    async fn fetch(&self, partition: &str, row: &str)
    -> Result<Option<StoredSnapshot>, StoreError>;

    /// Inserts (`expected_version == None`) or replaces the record and
    /// returns the new version. Fails with `Conflict` if the stored version
    /// is not `expected_version`.
    async fn upsert(
        &self,
        partition: &str,
        row: &str,
        snapshot: &Snapshot,
        expected_version: Option<i64>,
    ) -> Result<i64, StoreError>;
}
