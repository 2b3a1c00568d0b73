#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use lighthouse::mail::{MailError, MailTransport, OutboundMessage};
use lighthouse::opensea::MarketSource;
use market::{FetchedSnapshot, Observation, Offer, Sale};

/// Replays queued fetch results, one per cycle.
#[derive(Default, Clone)]
pub struct MockSource {
    pub queue: Arc<Mutex<VecDeque<FetchedSnapshot>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, fetched: FetchedSnapshot) {
        self.queue.lock().await.push_back(fetched);
    }
}

#[async_trait]
impl MarketSource for MockSource {
    async fn fetch(&self, _collection: &str) -> FetchedSnapshot {
        self.queue
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(unavailable)
    }
}

/// Records every message; optionally rejects them all.
#[derive(Default, Clone)]
pub struct RecordingTransport {
    pub sent: Arc<Mutex<Vec<OutboundMessage>>>,
    pub reject: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub async fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|m| m.subject.clone())
            .collect()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<u16, MailError> {
        self.sent.lock().await.push(message.clone());
        if self.reject {
            Err(MailError::Rejected(401))
        } else {
            Ok(200)
        }
    }
}

/* =========================
Fixtures
========================= */

pub fn unavailable() -> FetchedSnapshot {
    FetchedSnapshot {
        floor: Observation::Unavailable,
        best_offer: Observation::Unavailable,
        last_sale: Observation::Unavailable,
    }
}

pub fn sale(order_hash: &str) -> Sale {
    Sale {
        price: 0.9,
        currency: "ETH".into(),
        closing_date: 1_700_000_000,
        order_hash: order_hash.into(),
    }
}

pub fn observed(floor: f64, offer: f64, order_hash: &str) -> FetchedSnapshot {
    FetchedSnapshot {
        floor: Observation::Observed(Some(floor)),
        best_offer: Observation::Observed(Offer {
            value: offer,
            currency: "WETH".into(),
        }),
        last_sale: Observation::Observed(Some(sale(order_hash))),
    }
}
