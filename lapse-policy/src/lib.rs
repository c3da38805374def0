//! Forced expiration for transient destinations.
//!
//! Producers on work-queue style destinations often leave the expiration
//! unset, so abandoned messages accumulate forever. This crate decides, one
//! message at a time, whether such a message should be given an expiration
//! and what it should be.
//!
//! ## Policies
//!
//! - [`DestinationFilter`]: hierarchical wildcard matching over destination names
//! - [`PolicyConfig`]: the start-up configuration
//! - [`ExpirationPolicy`]: the per-message decision, see [`ExpirationPolicy::decide`]

mod config;
mod error;
mod expiration;
mod filter;

pub use config::PolicyConfig;
pub use error::PolicyError;
pub use expiration::{Decision, ExpirationPolicy, SkipReason};
pub use filter::DestinationFilter;
