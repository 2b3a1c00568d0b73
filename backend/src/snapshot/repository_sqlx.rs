use anyhow::{Context, anyhow};
use async_trait::async_trait;
use market::{Offer, Sale, Snapshot};
use sqlx::{AnyPool, Row};

use crate::snapshot::errors::StoreError;
use crate::snapshot::model::StoredSnapshot;
use crate::snapshot::repository::SnapshotRepository;
use crate::time::now_ms;

/// SQLx-backed implementation of SnapshotRepository.
/// Responsible only for persistence and row mapping.
pub struct SqlxSnapshotRepository {
    pool: AnyPool,
    table: String,
}

impl SqlxSnapshotRepository {
    /// `table` must be a validated identifier (see `AppConfig`).
    pub fn new(pool: AnyPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    async fn insert(
        &self,
        partition: &str,
        row: &str,
        snapshot: &Snapshot,
    ) -> Result<i64, StoreError> {
        let cols = SnapshotColumns::from(snapshot);

        let res = sqlx::query(&format!(
            r#"
INSERT INTO {} (
  partition_key, row_key,
  floor, best_offer, best_offer_currency,
  sale_price, sale_currency, sale_closing_date, sale_order_hash,
  version, updated_ms
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?);
"#,
            self.table
        ))
        .bind(partition.to_string())
        .bind(row.to_string())
        .bind(cols.floor)
        .bind(cols.best_offer)
        .bind(cols.best_offer_currency)
        .bind(cols.sale_price)
        .bind(cols.sale_currency)
        .bind(cols.sale_closing_date)
        .bind(cols.sale_order_hash)
        .bind(now_ms())
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(1),
            // Someone else bootstrapped the record first.
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::Conflict { expected: None })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn replace(
        &self,
        partition: &str,
        row: &str,
        snapshot: &Snapshot,
        expected: i64,
    ) -> Result<i64, StoreError> {
        let cols = SnapshotColumns::from(snapshot);
        let next = expected + 1;

        let res = sqlx::query(&format!(
            r#"
UPDATE {}
SET floor = ?, best_offer = ?, best_offer_currency = ?,
    sale_price = ?, sale_currency = ?, sale_closing_date = ?, sale_order_hash = ?,
    version = ?, updated_ms = ?
WHERE partition_key = ? AND row_key = ? AND version = ?;
"#,
            self.table
        ))
        .bind(cols.floor)
        .bind(cols.best_offer)
        .bind(cols.best_offer_currency)
        .bind(cols.sale_price)
        .bind(cols.sale_currency)
        .bind(cols.sale_closing_date)
        .bind(cols.sale_order_hash)
        .bind(next)
        .bind(now_ms())
        .bind(partition.to_string())
        .bind(row.to_string())
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(StoreError::Conflict {
                expected: Some(expected),
            });
        }

        Ok(next)
    }
}

#[async_trait]
impl SnapshotRepository for SqlxSnapshotRepository {
    async fn fetch(
        &self,
        partition: &str,
        row: &str,
    ) -> Result<Option<StoredSnapshot>, StoreError> {
        let found = sqlx::query(&format!(
            r#"
SELECT
  floor, best_offer, best_offer_currency,
  sale_price, sale_currency, sale_closing_date, sale_order_hash,
  version, updated_ms
FROM {}
WHERE partition_key = ? AND row_key = ?;
"#,
            self.table
        ))
        .bind(partition.to_string())
        .bind(row.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(r) = found else {
            return Ok(None);
        };

        let snapshot = match row_to_snapshot(&r) {
            Ok(s) => Some(s),
            Err(e) => {
                // poison-row resilience: keep the version so the row can be overwritten
                tracing::warn!(error = %e, "stored snapshot is unreadable");
                None
            }
        };

        Ok(Some(StoredSnapshot {
            version: r.try_get("version")?,
            snapshot,
            updated_ms: r.try_get("updated_ms")?,
        }))
    }

    async fn upsert(
        &self,
        partition: &str,
        row: &str,
        snapshot: &Snapshot,
        expected_version: Option<i64>,
    ) -> Result<i64, StoreError> {
        match expected_version {
            None => self.insert(partition, row, snapshot).await,
            Some(v) => self.replace(partition, row, snapshot, v).await,
        }
    }
}

/* =========================
Row mapping
========================= */

/// Column-level encoding of a snapshot.
struct SnapshotColumns {
    floor: Option<f64>,
    best_offer: Option<f64>,
    best_offer_currency: Option<String>,
    sale_price: Option<f64>,
    sale_currency: Option<String>,
    sale_closing_date: Option<i64>,
    sale_order_hash: Option<String>,
}

impl From<&Snapshot> for SnapshotColumns {
    fn from(s: &Snapshot) -> Self {
        let offer = s.best_offer.as_ref();
        let sale = s.last_sale.as_ref();

        Self {
            floor: s.floor,
            best_offer: offer.map(|o| o.value),
            best_offer_currency: offer.map(|o| o.currency.clone()),
            sale_price: sale.map(|x| x.price),
            sale_currency: sale.map(|x| x.currency.clone()),
            sale_closing_date: sale.map(|x| x.closing_date),
            sale_order_hash: sale.map(|x| x.order_hash.clone()),
        }
    }
}

fn row_to_snapshot(r: &sqlx::any::AnyRow) -> anyhow::Result<Snapshot> {
    let floor: Option<f64> = r.try_get("floor").context("floor")?;
    let best_offer: Option<f64> = r.try_get("best_offer").context("best_offer")?;
    let best_offer_currency: Option<String> = r
        .try_get("best_offer_currency")
        .context("best_offer_currency")?;

    let sale_price: Option<f64> = r.try_get("sale_price").context("sale_price")?;
    let sale_currency: Option<String> = r.try_get("sale_currency").context("sale_currency")?;
    let sale_closing_date: Option<i64> = r
        .try_get("sale_closing_date")
        .context("sale_closing_date")?;
    let sale_order_hash: Option<String> =
        r.try_get("sale_order_hash").context("sale_order_hash")?;

    let last_sale = match (sale_price, sale_currency, sale_closing_date, sale_order_hash) {
        (None, None, None, None) => None,
        (Some(price), Some(currency), Some(closing_date), Some(order_hash)) => Some(Sale {
            price: finite("sale_price", price)?,
            currency,
            closing_date,
            order_hash,
        }),
        _ => return Err(anyhow!("sale columns are partially populated")),
    };

    Ok(Snapshot {
        floor: floor.map(|v| finite("floor", v)).transpose()?,
        best_offer: best_offer
            .map(|v| {
                Ok::<_, anyhow::Error>(Offer {
                    value: finite("best_offer", v)?,
                    currency: best_offer_currency.unwrap_or_default(),
                })
            })
            .transpose()?,
        last_sale,
    })
}

fn finite(column: &str, v: f64) -> anyhow::Result<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(anyhow!("non-finite value in {column}: {v}"))
    }
}
