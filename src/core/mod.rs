//! Core tracking logic
//!
//! Providers and handlers classify a call and extract its metrics, the cost
//! module prices them, the budget module enforces limits, and the tracking
//! module ties it together for the host.

pub mod budget;
pub mod cost;
pub mod handlers;
pub mod providers;
pub mod streaming;
pub mod tracking;
pub mod types;
