pub mod schema;

use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;

#[derive(Clone)]
pub struct Db {
    pub pool: AnyPool,
}

impl Db {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        sqlx::any::install_default_drivers();

        // One cycle at a time; a small pool is plenty.
        let pool = AnyPoolOptions::new()
            .max_connections(2)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self, table: &str) -> anyhow::Result<()> {
        schema::migrate(&self.pool, table).await
    }
}
