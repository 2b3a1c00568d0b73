use std::sync::Arc;
use std::time::Duration;

use market::Snapshot;
use tracing::{debug, info, instrument, warn};

use crate::logger::warn_if_slow;
use crate::snapshot::errors::StoreError;
use crate::snapshot::model::{ROW_KEY, StoredSnapshot};
use crate::snapshot::repository::SnapshotRepository;

/// The monitor's view of persistence: one record at a fixed address.
pub struct SnapshotStore {
    repo: Arc<dyn SnapshotRepository>,
    partition: String,
}

impl SnapshotStore {
    pub fn new(repo: Arc<dyn SnapshotRepository>, partition: impl Into<String>) -> Self {
        Self {
            repo,
            partition: partition.into(),
        }
    }

    /// Reads the stored record. `Ok(None)` is the first-run signal; any
    /// error means the previous state is unknown.
    #[instrument(skip(self), target = "store", fields(partition = %self.partition))]
    pub async fn load(&self) -> Result<Option<StoredSnapshot>, StoreError> {
        let found = warn_if_slow("db_load_snapshot", Duration::from_millis(100), async {
            self.repo.fetch(&self.partition, ROW_KEY).await
        })
        .await?;

        match &found {
            Some(stored) => debug!(version = stored.version, "snapshot loaded"),
            None => warn!("no snapshot stored for this partition yet"),
        }

        Ok(found)
    }

    /// Writes `snapshot`, guarded by the version read earlier in the cycle.
    #[instrument(skip(self, snapshot), target = "store", fields(partition = %self.partition))]
    pub async fn save(
        &self,
        snapshot: &Snapshot,
        expected_version: Option<i64>,
    ) -> Result<i64, StoreError> {
        let version = warn_if_slow("db_save_snapshot", Duration::from_millis(100), async {
            self.repo
                .upsert(&self.partition, ROW_KEY, snapshot, expected_version)
                .await
        })
        .await?;

        info!(version, "snapshot updated");
        Ok(version)
    }
}
