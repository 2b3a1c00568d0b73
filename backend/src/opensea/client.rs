use std::time::Duration;

use market::opensea::{EventsEnvelope, ListingsEnvelope, OffersEnvelope};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::Secret;
use crate::opensea::errors::MarketError;

/// Thin client over the OpenSea v2 collection endpoints.
#[derive(Clone)]
pub struct OpenSeaClient {
    http: Client,
    base_url: String,
}

impl OpenSeaClient {
    pub fn new(base_url: String, api_key: &Secret, timeout: Duration) -> Result<Self, MarketError> {
        let mut key = HeaderValue::from_str(api_key.expose())?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("x-api-key", key);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Cheapest active listings, best first.
    #[instrument(skip(self), level = "debug")]
    pub async fn best_listings(
        &self,
        slug: &str,
        limit: u32,
    ) -> Result<ListingsEnvelope, MarketError> {
        let url = format!("{}/api/v2/listings/collection/{slug}/best", self.base_url);
        self.get_json(&url, &[("limit", limit.to_string())]).await
    }

    /// All active offers on the collection.
    #[instrument(skip(self), level = "debug")]
    pub async fn all_offers(&self, slug: &str, limit: u32) -> Result<OffersEnvelope, MarketError> {
        let url = format!("{}/api/v2/offers/collection/{slug}/all", self.base_url);
        self.get_json(&url, &[("limit", limit.to_string())]).await
    }

    /// Most recent sale events.
    #[instrument(skip(self), level = "debug")]
    pub async fn sale_events(&self, slug: &str, limit: u32) -> Result<EventsEnvelope, MarketError> {
        let url = format!("{}/api/v2/events/collection/{slug}", self.base_url);
        self.get_json(
            &url,
            &[
                ("event_type", "sale".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketError> {
        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        debug!(status = %resp.status(), url, "opensea response");

        Ok(resp.json().await?)
    }
}
