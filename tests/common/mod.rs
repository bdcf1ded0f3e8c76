//! Common test utilities for ai-usage-tracker
//!
//! - Vendor request/response fixtures and streaming transcripts
//! - A tracker harness wired to in-memory sinks and stores
//! - Cost assertions

pub mod assertions;
pub mod fixtures;
pub mod harness;

pub use harness::TrackerHarness;
