//! Command implementations

mod analyze;
mod anomalies;
mod bills;
mod input;

pub use analyze::cmd_analyze;
pub use anomalies::cmd_anomalies;
pub use bills::cmd_bills;
pub(crate) use input::load_inputs;
