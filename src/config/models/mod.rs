//! Configuration data models
//!
//! One file per section of the tracker configuration.

pub mod budget;
pub mod logging;
pub mod pricing;
pub mod providers;
pub mod tracking;

pub use budget::*;
pub use logging::*;
pub use pricing::*;
pub use providers::*;
pub use tracking::*;

/// Default for boolean switches that are on unless disabled
pub fn default_true() -> bool {
    true
}
