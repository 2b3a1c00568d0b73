//! Snapshot reconciliation.
//!
//! Decides, for one cycle, whether the freshly fetched snapshot is worth
//! persisting and whether a human should be told about it.
//!
//! Rules are evaluated in order and the first match wins:
//! 1. no stored snapshot                      → `Bootstrap`
//! 2. best-offer moved by `>= significant`    → `SignificantChange`
//! 3. floor or last sale differ at all        → `SignificantChange`
//! 4. best-offer moved by `> minor`           → `MinorChange`
//! 5. otherwise                               → `NoChange`
//!
//! Offers drift continuously, so they get a coarse alert threshold. Floor and
//! sale identity are discrete: any difference is significant.

use crate::snapshot::Snapshot;

/// Best-offer movement at or above which a human is notified.
pub const MIN_OFFER_CHANGE: f64 = 0.5;

/// Best-offer movement above which the snapshot is refreshed silently.
pub const OFFER_NOISE_FLOOR: f64 = 0.001;

/// Verdict for one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// No prior snapshot exists.
    Bootstrap,
    SignificantChange,
    /// Real but immaterial best-offer movement.
    MinorChange,
    NoChange,
}

impl Disposition {
    /// Whether the new snapshot replaces the stored one.
    pub fn persists(self) -> bool {
        !matches!(self, Disposition::NoChange)
    }

    /// Whether a notification goes out. Bootstrap only notifies when the
    /// deployment asked for a first-data notice.
    pub fn notifies(self, announce_bootstrap: bool) -> bool {
        match self {
            Disposition::Bootstrap => announce_bootstrap,
            Disposition::SignificantChange => true,
            Disposition::MinorChange | Disposition::NoChange => false,
        }
    }
}

/// Offer-movement thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    pub significant_offer_delta: f64,
    pub minor_offer_delta: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            significant_offer_delta: MIN_OFFER_CHANGE,
            minor_offer_delta: OFFER_NOISE_FLOOR,
        }
    }
}

/// Reconciles with the default thresholds.
pub fn reconcile(old: Option<&Snapshot>, new: &Snapshot) -> Disposition {
    reconcile_with(old, new, Thresholds::default())
}

pub fn reconcile_with(old: Option<&Snapshot>, new: &Snapshot, t: Thresholds) -> Disposition {
    let Some(old) = old else {
        return Disposition::Bootstrap;
    };

    // An incomparable offer must not silence an alert.
    let Some(delta) = offer_delta(old, new) else {
        return Disposition::SignificantChange;
    };

    if delta >= t.significant_offer_delta {
        return Disposition::SignificantChange;
    }

    if old.floor != new.floor || old.last_sale != new.last_sale {
        return Disposition::SignificantChange;
    }

    if delta > t.minor_offer_delta {
        return Disposition::MinorChange;
    }

    Disposition::NoChange
}

/// `|new.best_offer - old.best_offer|`, or `None` when the two cannot be
/// compared (present on one side only, or non-finite).
pub fn offer_delta(old: &Snapshot, new: &Snapshot) -> Option<f64> {
    match (&old.best_offer, &new.best_offer) {
        (None, None) => Some(0.0),
        (Some(a), Some(b)) => {
            let d = (b.value - a.value).abs();
            d.is_finite().then_some(d)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Offer, Sale};

    fn snap(floor: Option<f64>, offer: f64, sale: &str) -> Snapshot {
        Snapshot {
            floor,
            best_offer: Some(Offer {
                value: offer,
                currency: "WETH".into(),
            }),
            last_sale: Some(Sale {
                price: 1.0,
                currency: "ETH".into(),
                closing_date: 1_700_000_000,
                order_hash: sale.into(),
            }),
        }
    }

    #[test]
    fn no_prior_snapshot_is_bootstrap() {
        assert_eq!(reconcile(None, &Snapshot::default()), Disposition::Bootstrap);
    }

    #[test]
    fn offer_threshold_is_inclusive() {
        let old = snap(Some(1.0), 1.0, "a");
        let new = snap(Some(1.0), 1.5, "a");
        assert_eq!(reconcile(Some(&old), &new), Disposition::SignificantChange);
    }

    #[test]
    fn floor_change_is_significant_even_with_flat_offer() {
        let old = snap(Some(1.0), 1.0, "a");
        let new = snap(Some(1.01), 1.0, "a");
        assert_eq!(reconcile(Some(&old), &new), Disposition::SignificantChange);
    }

    #[test]
    fn floor_disappearing_is_significant() {
        let old = snap(Some(1.0), 1.0, "a");
        let new = snap(None, 1.0, "a");
        assert_eq!(reconcile(Some(&old), &new), Disposition::SignificantChange);
    }

    #[test]
    fn new_sale_is_significant() {
        let old = snap(Some(1.0), 1.0, "a");
        let new = snap(Some(1.0), 1.0, "b");
        assert_eq!(reconcile(Some(&old), &new), Disposition::SignificantChange);
    }

    #[test]
    fn small_offer_drift_is_minor() {
        let old = snap(Some(1.0), 1.0, "a");
        let new = snap(Some(1.0), 1.2, "a");
        assert_eq!(reconcile(Some(&old), &new), Disposition::MinorChange);
    }

    #[test]
    fn noise_level_drift_is_no_change() {
        let old = snap(Some(1.0), 1.0, "a");
        let new = snap(Some(1.0), 1.0005, "a");
        assert_eq!(reconcile(Some(&old), &new), Disposition::NoChange);
    }

    #[test]
    fn offer_present_on_one_side_only_forces_significant() {
        let old = Snapshot {
            best_offer: None,
            ..snap(Some(1.0), 1.0, "a")
        };
        let new = snap(Some(1.0), 1.0, "a");
        assert_eq!(reconcile(Some(&old), &new), Disposition::SignificantChange);
        assert_eq!(offer_delta(&old, &new), None);
    }

    #[test]
    fn custom_thresholds_apply() {
        let t = Thresholds {
            significant_offer_delta: 0.1,
            minor_offer_delta: 0.01,
        };
        let old = snap(Some(1.0), 1.0, "a");
        let new = snap(Some(1.0), 1.2, "a");
        assert_eq!(
            reconcile_with(Some(&old), &new, t),
            Disposition::SignificantChange
        );
    }

    #[test]
    fn action_mapping() {
        assert!(Disposition::Bootstrap.persists());
        assert!(Disposition::SignificantChange.persists());
        assert!(Disposition::MinorChange.persists());
        assert!(!Disposition::NoChange.persists());

        assert!(!Disposition::Bootstrap.notifies(false));
        assert!(Disposition::Bootstrap.notifies(true));
        assert!(Disposition::SignificantChange.notifies(false));
        assert!(!Disposition::MinorChange.notifies(true));
        assert!(!Disposition::NoChange.notifies(true));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::snapshot::{Offer, Sale};
    use proptest::prelude::*;

    fn with_offer(base: &Snapshot, value: f64) -> Snapshot {
        Snapshot {
            best_offer: Some(Offer {
                value,
                currency: "WETH".into(),
            }),
            ..base.clone()
        }
    }

    fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
        (
            prop::option::of(0.0..100.0f64),
            0.0..100.0f64,
            prop::option::of((0.0..10.0f64, 0..2_000_000_000i64, "[a-f0-9]{8}")),
        )
            .prop_map(|(floor, offer, sale)| Snapshot {
                floor,
                best_offer: Some(Offer {
                    value: offer,
                    currency: "WETH".into(),
                }),
                last_sale: sale.map(|(price, closing_date, order_hash)| Sale {
                    price,
                    currency: "ETH".into(),
                    closing_date,
                    order_hash,
                }),
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn large_offer_moves_are_always_significant(
            old in arb_snapshot(),
            new in arb_snapshot(),
            delta in 0.5..50.0f64,
        ) {
            let base = old.best_offer.as_ref().map(|o| o.value).unwrap_or(0.0);
            let new = with_offer(&new, base + delta);
            let moved = offer_delta(&old, &new).unwrap();
            prop_assume!(moved >= MIN_OFFER_CHANGE);
            prop_assert_eq!(reconcile(Some(&old), &new), Disposition::SignificantChange);
        }

        #[test]
        fn noise_with_same_floor_and_sale_is_no_change(
            old in arb_snapshot(),
            delta in 0.0..=0.001f64,
        ) {
            let base = old.best_offer.as_ref().map(|o| o.value).unwrap_or(0.0);
            let new = with_offer(&old, base + delta);
            let moved = offer_delta(&old, &new).unwrap();
            prop_assume!(moved <= OFFER_NOISE_FLOOR);
            prop_assert_eq!(reconcile(Some(&old), &new), Disposition::NoChange);
        }

        #[test]
        fn immaterial_band_is_minor(
            old in arb_snapshot(),
            delta in 0.0011..0.4999f64,
        ) {
            let base = old.best_offer.as_ref().map(|o| o.value).unwrap_or(0.0);
            let new = with_offer(&old, base + delta);
            let moved = offer_delta(&old, &new).unwrap();
            prop_assume!(moved > OFFER_NOISE_FLOOR && moved < MIN_OFFER_CHANGE);
            prop_assert_eq!(reconcile(Some(&old), &new), Disposition::MinorChange);
        }

        #[test]
        fn absent_prior_is_always_bootstrap(new in arb_snapshot()) {
            prop_assert_eq!(reconcile(None, &new), Disposition::Bootstrap);
        }
    }
}
