//! SMART-G core: wearable risk classification, sampling, and the bounded
//! alert and history logs it produces.

pub mod domain;
pub mod thresholds;
pub mod config;
pub mod classifier;
pub mod random;
pub mod clock;
pub mod generator;
pub mod worker;
pub mod alert_log;
pub mod history;
pub mod state;
pub mod store;
pub mod validation;
pub mod monitor;
pub mod scheduler;

pub use domain::*;
pub use thresholds::*;
pub use self::config::*;
pub use classifier::*;
pub use random::*;
pub use clock::*;
pub use generator::*;
pub use worker::*;
pub use alert_log::*;
pub use history::*;
pub use state::*;
pub use store::*;
pub use validation::*;
pub use monitor::*;
pub use scheduler::*;

#[cfg(test)]
mod tests_tick;
#[cfg(test)]
mod tests_pairing;
#[cfg(test)]
mod tests_config;
