use sqlx::AnyPool;

/// Creates the snapshot table if it does not exist yet.
///
/// `table` must already be validated as a plain identifier.
pub async fn migrate(pool: &AnyPool, table: &str) -> anyhow::Result<()> {
    sqlx::query(&format!(
        r#"
CREATE TABLE IF NOT EXISTS {table} (
  partition_key TEXT NOT NULL,
  row_key TEXT NOT NULL,
  floor REAL NULL,
  best_offer REAL NULL,
  best_offer_currency TEXT NULL,
  sale_price REAL NULL,
  sale_currency TEXT NULL,
  sale_closing_date BIGINT NULL,
  sale_order_hash TEXT NULL,
  version BIGINT NOT NULL,
  updated_ms BIGINT NOT NULL,
  PRIMARY KEY (partition_key, row_key)
);
"#
    ))
    .execute(pool)
    .await?;

    Ok(())
}
