//! Integration tests for ai-usage-tracker
//!
//! These tests drive the public API across module boundaries with real
//! vendor-shaped payloads and in-memory collaborators.

pub mod budget_tests;
pub mod config_tests;
pub mod cost_tests;
pub mod resolution_tests;
pub mod streaming_tests;
pub mod tracker_tests;
