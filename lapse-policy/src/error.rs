//! Error types for the lapse-policy crate.
//!
//! Decisions never fail; these errors only arise while building a policy
//! from configuration.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// A destination pattern could not be compiled.
    #[error("Invalid destination pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
