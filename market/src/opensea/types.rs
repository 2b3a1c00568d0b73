//! Response payloads of the OpenSea v2 collection endpoints.
//!
//! Only the fields the monitor reads are modelled. Numeric amounts arrive
//! either as JSON strings or JSON numbers depending on the endpoint, so they
//! are kept as raw `Value`s and parsed during extraction.
//!
//! Decoding is tolerant below the envelope: a sub-field with an unexpected
//! JSON type decodes as `None`, and a list entry that is not an object
//! decodes as an empty entry. Extraction then skips or defaults it, so one
//! malformed entry never discards the whole response.

use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::Value;
use tracing::warn;

/// `GET /api/v2/listings/collection/{slug}/best`
#[derive(Debug, Default, Deserialize)]
pub struct ListingsEnvelope {
    #[serde(default, deserialize_with = "lenient_entries")]
    pub listings: Vec<Listing>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Listing {
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<ListingPrice>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingPrice {
    #[serde(default, deserialize_with = "lenient")]
    pub current: Option<PriceAmount>,
}

/// Integer-denominated amount plus its power-of-ten scale.
#[derive(Debug, Default, Deserialize)]
pub struct PriceAmount {
    pub value: Option<Value>,
    pub decimals: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub currency: Option<String>,
}

/// `GET /api/v2/offers/collection/{slug}/all`
#[derive(Debug, Default, Deserialize)]
pub struct OffersEnvelope {
    #[serde(default, deserialize_with = "lenient_entries")]
    pub offers: Vec<OfferEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OfferEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<PriceAmount>,
}

/// `GET /api/v2/events/collection/{slug}?event_type=sale`
#[derive(Debug, Default, Deserialize)]
pub struct EventsEnvelope {
    #[serde(default, deserialize_with = "lenient_entries")]
    pub asset_events: Vec<AssetEvent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssetEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub event_type: Option<String>,
    /// Unix seconds.
    pub closing_date: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub order_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub payment: Option<Payment>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Payment {
    pub quantity: Option<Value>,
    pub decimals: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub symbol: Option<String>,
}

/// Any JSON value; `None` when it does not decode as `T`.
fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(de)?;
    if raw.is_null() {
        return Ok(None);
    }

    match serde_json::from_value(raw) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            warn!(error = %e, "malformed field ignored");
            Ok(None)
        }
    }
}

/// A JSON array (or null) whose malformed entries decode as `T::default()`.
fn lenient_entries<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Option::<Vec<Value>>::deserialize(de)?.unwrap_or_default();

    Ok(raw
        .into_iter()
        .map(|entry| {
            serde_json::from_value(entry).unwrap_or_else(|e| {
                warn!(error = %e, "malformed entry ignored");
                T::default()
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrong_typed_leaf_decodes_as_none() {
        let resp: ListingsEnvelope = serde_json::from_value(json!({
            "listings": [
                { "price": { "current": { "currency": 1, "decimals": 18, "value": "1" } } }
            ]
        }))
        .unwrap();

        let current = resp.listings[0]
            .price
            .as_ref()
            .and_then(|p| p.current.as_ref())
            .unwrap();
        assert_eq!(current.currency, None);
        assert_eq!(current.value, Some(json!("1")));
    }

    #[test]
    fn non_object_entry_decodes_as_empty() {
        let resp: OffersEnvelope = serde_json::from_value(json!({
            "offers": [ "garbage", { "price": "garbage" }, { "price": { "value": "5" } } ]
        }))
        .unwrap();

        assert_eq!(resp.offers.len(), 3);
        assert!(resp.offers[0].price.is_none());
        assert!(resp.offers[1].price.is_none());
        assert!(resp.offers[2].price.is_some());
    }

    #[test]
    fn null_list_is_empty() {
        let resp: EventsEnvelope =
            serde_json::from_value(json!({ "asset_events": null })).unwrap();
        assert!(resp.asset_events.is_empty());
    }

    #[test]
    fn non_array_list_still_fails() {
        let resp = serde_json::from_value::<OffersEnvelope>(json!({ "offers": "none" }));
        assert!(resp.is_err());
    }
}
