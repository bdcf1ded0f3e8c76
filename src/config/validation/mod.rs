//! Configuration validation
//!
//! - `trait_def`: the Validate trait
//! - `validators`: one implementation per configuration section
//! - `tests`: validator tests

mod trait_def;
mod validators;

pub use trait_def::Validate;
