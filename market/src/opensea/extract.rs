//! Field extraction: raw OpenSea payloads → normalized snapshot fields.
//!
//! Extraction never aborts a cycle. A malformed or missing sub-field degrades
//! only the field it belongs to and is reported through `tracing`.

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::errors::ExtractError;
use crate::opensea::types::{AssetEvent, EventsEnvelope, ListingsEnvelope, OffersEnvelope};
use crate::snapshot::{Offer, Sale};

const SALE_EVENT: &str = "sale";
const UNKNOWN_CURRENCY: &str = "Unknown";
const DEFAULT_SALE_CURRENCY: &str = "ETH";

/// Floor price from a best-listings response, or `None` (logged) if the
/// first listing is missing or unreadable.
pub fn extract_floor_price(resp: &ListingsEnvelope) -> Option<f64> {
    match floor_price(resp) {
        Ok(floor) => {
            debug!(floor, "floor price extracted");
            Some(floor)
        }
        Err(e) => {
            error!(error = %e, "floor price unavailable");
            None
        }
    }
}

/// Strict variant of [`extract_floor_price`] that reports why the floor is absent.
pub fn floor_price(resp: &ListingsEnvelope) -> Result<f64, ExtractError> {
    let listing = resp.listings.first().ok_or(ExtractError::NoListings)?;

    let current = listing
        .price
        .as_ref()
        .and_then(|p| p.current.as_ref())
        .ok_or(ExtractError::MissingField("price.current"))?;

    let raw = current
        .value
        .as_ref()
        .ok_or(ExtractError::MissingField("price.current.value"))?;
    let decimals = current
        .decimals
        .as_ref()
        .ok_or(ExtractError::MissingField("price.current.decimals"))?;

    Ok(scale(
        parse_amount("price.current.value", raw)?,
        parse_decimals("price.current.decimals", decimals)?,
    ))
}

/// Highest offer after decimal normalization.
///
/// An empty offer set yields a zero offer. Offers whose amount cannot be
/// parsed are skipped. Ties keep the first offer seen.
pub fn extract_best_offer(resp: &OffersEnvelope) -> Offer {
    if resp.offers.is_empty() {
        warn!("no offers found");
        return Offer::zero();
    }

    info!(count = resp.offers.len(), "scanning offers");

    let mut best = Offer::zero();
    for entry in &resp.offers {
        let Some(price) = entry.price.as_ref() else {
            warn!("offer without price skipped");
            continue;
        };

        let value = match offer_value(price.value.as_ref(), price.decimals.as_ref()) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "invalid offer skipped");
                continue;
            }
        };

        let currency = price.currency.as_deref().unwrap_or(UNKNOWN_CURRENCY);
        debug!(value, currency, "offer");

        if value > best.value {
            best = Offer {
                value,
                currency: currency.to_string(),
            };
        }
    }

    info!(value = best.value, currency = %best.currency, "highest offer");
    best
}

fn offer_value(value: Option<&Value>, decimals: Option<&Value>) -> Result<f64, ExtractError> {
    let amount = match value {
        Some(v) => parse_amount("price.value", v)?,
        None => 0.0,
    };
    let decimals = match decimals {
        Some(d) => parse_decimals("price.decimals", d)?,
        None => 0,
    };
    Ok(scale(amount, decimals))
}

/// Most recent sale among the returned events, or `None` (logged) if there
/// is no usable sale event.
///
/// Events are compared on `closing_date` with a strict `>`, so the first of
/// several equally recent sales wins.
pub fn extract_last_sale(resp: &EventsEnvelope) -> Option<Sale> {
    let mut latest: Option<Sale> = None;

    for event in &resp.asset_events {
        if event.event_type.as_deref() != Some(SALE_EVENT) {
            continue;
        }

        let sale = match sale_from_event(event) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "unreadable sale event skipped");
                continue;
            }
        };

        let newer = latest
            .as_ref()
            .is_none_or(|cur| sale.closing_date > cur.closing_date);
        if newer {
            latest = Some(sale);
        }
    }

    match latest {
        Some(sale) => {
            info!(
                price = sale.price,
                closing_date = sale.closing_date,
                order_hash = %sale.order_hash,
                "most recent sale"
            );
            Some(sale)
        }
        None => {
            error!(error = %ExtractError::NoSaleEvents, "last sale unavailable");
            None
        }
    }
}

fn sale_from_event(event: &AssetEvent) -> Result<Sale, ExtractError> {
    let closing_date = event
        .closing_date
        .as_ref()
        .ok_or(ExtractError::MissingField("closing_date"))
        .and_then(|v| parse_integer("closing_date", v))?;

    let payment = event.payment.as_ref();
    let quantity = payment
        .and_then(|p| p.quantity.as_ref())
        .ok_or(ExtractError::MissingField("payment.quantity"))?;
    let decimals = match payment.and_then(|p| p.decimals.as_ref()) {
        Some(d) => parse_decimals("payment.decimals", d)?,
        None => 0,
    };

    Ok(Sale {
        price: scale(parse_amount("payment.quantity", quantity)?, decimals),
        currency: payment
            .and_then(|p| p.symbol.clone())
            .unwrap_or_else(|| DEFAULT_SALE_CURRENCY.to_string()),
        closing_date,
        order_hash: event
            .order_hash
            .clone()
            .unwrap_or_else(|| UNKNOWN_CURRENCY.to_string()),
    })
}

/* =========================
Numeric parsing
========================= */

/// `amount / 10^decimals`
pub fn scale(amount: f64, decimals: i32) -> f64 {
    amount / 10f64.powi(decimals)
}

fn parse_amount(field: &'static str, v: &Value) -> Result<f64, ExtractError> {
    let parsed = match v {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };

    match parsed {
        Some(x) if x.is_finite() => Ok(x),
        _ => Err(ExtractError::NotNumeric {
            field,
            raw: v.to_string(),
        }),
    }
}

fn parse_integer(field: &'static str, v: &Value) -> Result<i64, ExtractError> {
    let parsed = match v {
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    };

    parsed.ok_or_else(|| ExtractError::NotNumeric {
        field,
        raw: v.to_string(),
    })
}

fn parse_decimals(field: &'static str, v: &Value) -> Result<i32, ExtractError> {
    let d = parse_integer(field, v)?;
    i32::try_from(d).map_err(|_| ExtractError::NotNumeric {
        field,
        raw: v.to_string(),
    })
}
