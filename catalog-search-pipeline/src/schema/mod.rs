//! Index registration and availability tracking.

mod monitor;
mod registrar;

pub use monitor::{AvailabilityMonitor, MonitorConfig};
pub use registrar::SchemaRegistrar;
