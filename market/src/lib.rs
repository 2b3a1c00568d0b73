//! Market snapshot model and the change-detection core of the monitor.
//!
//! Everything here is pure: no I/O, no clocks except those passed in.

pub mod compose;
pub mod errors;
pub mod observation;
pub mod opensea;
pub mod reconcile;
pub mod snapshot;

pub use compose::{Notification, compose};
pub use observation::{FetchedSnapshot, Observation};
pub use reconcile::{Disposition, Thresholds, reconcile, reconcile_with};
pub use snapshot::{Offer, Sale, Snapshot};
