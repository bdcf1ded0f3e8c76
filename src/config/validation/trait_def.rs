//! Validation trait definition

/// Implemented by every configuration section
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}
