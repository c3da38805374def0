//! Error types for the lapse-common crate.

use thiserror::Error;

/// Errors raised when parsing a qualified destination name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DestinationError {
    /// The name has no `kind://` prefix.
    #[error("Missing destination kind in '{0}' (expected e.g. queue://name)")]
    MissingKind(String),

    /// The prefix is not one of the known destination kinds.
    #[error("Unknown destination kind '{0}'")]
    UnknownKind(String),

    /// Nothing follows the prefix.
    #[error("Destination name is empty")]
    EmptyName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_error_display() {
        assert_eq!(
            DestinationError::MissingKind("orders".to_string()).to_string(),
            "Missing destination kind in 'orders' (expected e.g. queue://name)"
        );
        assert_eq!(
            DestinationError::UnknownKind("mailbox".to_string()).to_string(),
            "Unknown destination kind 'mailbox'"
        );
    }
}
