use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use market::opensea::{
    EventsEnvelope, ListingsEnvelope, OffersEnvelope, extract_best_offer, extract_floor_price,
    extract_last_sale,
};
use market::{FetchedSnapshot, Observation};
use tracing::{error, instrument};

use crate::logger::warn_if_slow;
use crate::opensea::client::OpenSeaClient;
use crate::opensea::errors::MarketError;

pub const LISTING_LIMIT: u32 = 1;
pub const OFFER_LIMIT: u32 = 100;
pub const SALE_EVENT_LIMIT: u32 = 3;

/// Source of per-field market observations for one collection.
#[async_trait]
pub trait MarketSource: Send + Sync {
    async fn fetch(&self, collection: &str) -> FetchedSnapshot;
}

#[async_trait]
impl MarketSource for OpenSeaClient {
    /// Runs the three upstream queries; each failure only marks its own
    /// field unavailable.
    #[instrument(skip(self))]
    async fn fetch(&self, collection: &str) -> FetchedSnapshot {
        let (floor, best_offer, last_sale) = tokio::join!(
            observe(
                "floor",
                self.best_listings(collection, LISTING_LIMIT),
                |r: ListingsEnvelope| extract_floor_price(&r),
            ),
            observe(
                "best_offer",
                self.all_offers(collection, OFFER_LIMIT),
                |r: OffersEnvelope| extract_best_offer(&r),
            ),
            observe(
                "last_sale",
                self.sale_events(collection, SALE_EVENT_LIMIT),
                |r: EventsEnvelope| extract_last_sale(&r),
            ),
        );

        FetchedSnapshot {
            floor,
            best_offer,
            last_sale,
        }
    }
}

async fn observe<R, T, F>(
    field: &'static str,
    call: F,
    extract: impl FnOnce(R) -> T,
) -> Observation<T>
where
    F: Future<Output = Result<R, MarketError>>,
{
    match warn_if_slow("opensea_request", Duration::from_secs(2), call).await {
        Ok(resp) => Observation::Observed(extract(resp)),
        Err(e) => {
            error!(field, error = %e, "failed to fetch market data");
            Observation::Unavailable
        }
    }
}
