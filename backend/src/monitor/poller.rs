//! Fixed-cadence driver for the monitor.
//!
//! The first tick fires immediately, so a cycle runs on startup. Ticks missed
//! while a cycle was running are skipped, never queued, so cycles cannot
//! overlap.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{Instrument, error, info};

use crate::logger::{TraceId, cycle_span};
use crate::monitor::cycle::Monitor;

/// Runs cycles forever; cycle errors are logged and the next tick proceeds.
pub async fn run_monitor_loop(monitor: Monitor, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        collection = %monitor.collection(),
        every_ms = every.as_millis() as u64,
        "market monitor started"
    );

    loop {
        let scheduled = ticker.tick().await;
        let late = is_late(scheduled, Instant::now(), every);

        let span = cycle_span(monitor.collection(), &TraceId::generate(), late);
        async {
            if late {
                info!("the timer is past due");
            }

            match monitor.run_cycle().await {
                Ok(outcome) => info!(
                    disposition = ?outcome.disposition,
                    version = ?outcome.version,
                    notified = outcome.notified,
                    "cycle finished"
                ),
                Err(e) => error!(error = %e, "cycle aborted"),
            }
        }
        .instrument(span)
        .await;
    }
}

/// A tick is late when it fired more than one full interval after its
/// scheduled deadline.
pub fn is_late(scheduled: Instant, fired: Instant, every: Duration) -> bool {
    fired.saturating_duration_since(scheduled) > every
}
