use crate::snapshot::{Offer, Snapshot, Sale};

/// Outcome of one upstream call for one snapshot field.
#[derive(Clone, Debug, PartialEq)]
pub enum Observation<T> {
    /// The call succeeded; the payload may still carry an absent value.
    Observed(T),
    /// The call itself failed; the current value is unknown.
    Unavailable,
}

impl<T> Observation<T> {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Observation::Unavailable)
    }

    fn or_carry(self, previous: impl FnOnce() -> T) -> T {
        match self {
            Observation::Observed(v) => v,
            Observation::Unavailable => previous(),
        }
    }
}

/// Per-field results of one fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchedSnapshot {
    pub floor: Observation<Option<f64>>,
    pub best_offer: Observation<Offer>,
    pub last_sale: Observation<Option<Sale>>,
}

impl FetchedSnapshot {
    /// True when every upstream call failed.
    pub fn is_unavailable(&self) -> bool {
        self.floor.is_unavailable()
            && self.best_offer.is_unavailable()
            && self.last_sale.is_unavailable()
    }

    /// Names of the fields whose upstream call failed.
    pub fn unavailable_fields(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.floor.is_unavailable() {
            out.push("floor");
        }
        if self.best_offer.is_unavailable() {
            out.push("best_offer");
        }
        if self.last_sale.is_unavailable() {
            out.push("last_sale");
        }
        out
    }

    /// Builds the cycle's snapshot.
    ///
    /// Unavailable fields keep their previous value so a failed call is never
    /// mistaken for a change. Returns `None` when nothing was observed.
    pub fn resolve(self, previous: Option<&Snapshot>) -> Option<Snapshot> {
        if self.is_unavailable() {
            return None;
        }

        Some(Snapshot {
            floor: self.floor.or_carry(|| previous.and_then(|p| p.floor)),
            best_offer: match self.best_offer {
                Observation::Observed(o) => Some(o),
                Observation::Unavailable => previous.and_then(|p| p.best_offer.clone()),
            },
            last_sale: self
                .last_sale
                .or_carry(|| previous.and_then(|p| p.last_sale.clone())),
        })
    }
}
