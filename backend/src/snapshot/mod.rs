pub mod errors;
pub mod model;
pub mod repository;
pub mod repository_sqlx;
pub mod store;

pub use errors::StoreError;
pub use model::{ROW_KEY, StoredSnapshot};
pub use repository::SnapshotRepository;
pub use repository_sqlx::SqlxSnapshotRepository;
pub use store::SnapshotStore;
