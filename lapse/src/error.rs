//! Error types for the lapse crate.

use lapse_common::Destination;
use lapse_policy::PolicyError;
use thiserror::Error;

/// Failures raised by a broker further down the send chain.
///
/// The expiration interceptor passes these through untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrokerError {
    /// The broker refused the message for this destination.
    #[error("Message rejected by {destination}: {reason}")]
    Rejected {
        destination: Destination,
        reason: String,
    },

    /// The message could not be routed because it has no destination.
    #[error("Message {0} has no destination")]
    NoDestination(String),
}

/// Errors building a host from configuration.
#[derive(Debug, Error)]
pub enum LapseError {
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Two regions were configured for the same destination.
    #[error("Duplicate region for {0}")]
    DuplicateRegion(Destination),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_error_display() {
        let err = BrokerError::Rejected {
            destination: Destination::queue("a.b"),
            reason: "quota exceeded".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Message rejected by queue://a.b: quota exceeded"
        );

        let err = LapseError::DuplicateRegion(Destination::topic("t"));
        assert_eq!(err.to_string(), "Duplicate region for topic://t");
    }
}
