//! One monitoring cycle.
//!
//! Data flow:
//! Store (read) → MarketSource → reconcile → Store (write) → compose → Mail
//!
//! The store is read before fetching so a store outage aborts the cycle
//! without spending upstream calls, and so the write can be guarded by the
//! version that was read.

use std::sync::Arc;

use chrono::Utc;
use market::compose::collection_url;
use market::reconcile::offer_delta;
use market::{Disposition, Snapshot, Thresholds, compose, reconcile_with};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::error::CycleError;
use crate::logger::annotate_disposition;
use crate::mail::MailDispatcher;
use crate::opensea::MarketSource;
use crate::snapshot::{SnapshotStore, StoredSnapshot};

/// Behavior knobs of the monitor, separated from transport settings.
#[derive(Clone, Debug)]
pub struct MonitorSettings {
    pub collection: String,
    pub thresholds: Thresholds,
    pub notify_on_bootstrap: bool,
}

impl From<&AppConfig> for MonitorSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            collection: cfg.collection_slug.clone(),
            thresholds: cfg.thresholds,
            notify_on_bootstrap: cfg.notify_on_bootstrap,
        }
    }
}

/// What a completed cycle did.
#[derive(Clone, Debug, PartialEq)]
pub struct CycleOutcome {
    pub disposition: Disposition,
    /// New record version, if the snapshot was written.
    pub version: Option<i64>,
    pub notified: bool,
}

pub struct Monitor {
    settings: MonitorSettings,
    collection_url: String,
    source: Arc<dyn MarketSource>,
    store: SnapshotStore,
    dispatcher: MailDispatcher,
}

impl Monitor {
    pub fn new(
        settings: MonitorSettings,
        source: Arc<dyn MarketSource>,
        store: SnapshotStore,
        dispatcher: MailDispatcher,
    ) -> Self {
        Self {
            collection_url: collection_url(&settings.collection),
            settings,
            source,
            store,
            dispatcher,
        }
    }

    pub fn collection(&self) -> &str {
        &self.settings.collection
    }

    pub async fn run_cycle(&self) -> Result<CycleOutcome, CycleError> {
        let stored = self.store.load().await.inspect_err(|e| {
            error!(error = %e, "failed to read previous snapshot; cancelling cycle");
        })?;

        let previous = stored.as_ref().and_then(|s| s.snapshot.as_ref());
        let expected_version = stored.as_ref().map(|s| s.version);

        let fetched = self.source.fetch(&self.settings.collection).await;
        let unavailable = fetched.unavailable_fields();
        if !unavailable.is_empty() {
            warn!(fields = ?unavailable, "some market data unavailable; keeping previous values");
        }

        let Some(current) = fetched.resolve(previous) else {
            error!("failed to get any market data; cancelling cycle");
            return Err(CycleError::UpstreamFetchFailed);
        };

        let disposition = self.decide(stored.as_ref(), previous, &current);
        annotate_disposition(&disposition);

        let version = if disposition.persists() {
            Some(
                self.store
                    .save(&current, expected_version)
                    .await
                    .inspect_err(|e| error!(error = %e, "failed to persist snapshot"))?,
            )
        } else {
            None
        };

        let notified = if disposition.notifies(self.settings.notify_on_bootstrap) {
            info!("composing and sending email");
            let notification = compose(previous, &current, &self.collection_url, Utc::now());
            self.dispatcher.dispatch(&notification).await
        } else {
            false
        };

        Ok(CycleOutcome {
            disposition,
            version,
            notified,
        })
    }

    fn decide(
        &self,
        stored: Option<&StoredSnapshot>,
        previous: Option<&Snapshot>,
        current: &Snapshot,
    ) -> Disposition {
        if matches!(stored, Some(s) if s.snapshot.is_none()) {
            warn!("stored snapshot unreadable; treating as significant change");
            return Disposition::SignificantChange;
        }

        if let Some(prev) = previous {
            debug!(
                old_best_offer = ?prev.best_offer.as_ref().map(|o| o.value),
                best_offer = ?current.best_offer.as_ref().map(|o| o.value),
                offer_delta = ?offer_delta(prev, current),
                "comparing best offers"
            );
        }

        let disposition = reconcile_with(previous, current, self.settings.thresholds);
        match disposition {
            Disposition::Bootstrap => info!("no prior data found; writing fetched data"),
            Disposition::SignificantChange => info!("change detected; writing fetched data"),
            Disposition::MinorChange => {
                info!("minor offer change detected; updating data without sending email")
            }
            Disposition::NoChange => info!("no change detected"),
        }
        disposition
    }
}
