pub mod cycle;
pub mod poller;

pub use cycle::{CycleOutcome, Monitor, MonitorSettings};
pub use poller::run_monitor_loop;
