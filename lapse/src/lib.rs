//! Host-side wiring for the expiration policy.
//!
//! The policy itself lives in `lapse-policy`; this crate installs it into a
//! chain of [`Broker`]s so it runs once per message on the producer's send
//! path, and provides an in-memory host for running messages through it.

pub mod broker;
pub mod controller;
pub mod error;
pub mod interceptor;
pub mod memory;
pub mod region;

pub use broker::{Broker, BrokerPlugin, ProducerExchange, chain};
pub use controller::{Host, Lapse, MessageSpec, Report};
pub use error::{BrokerError, LapseError};
pub use interceptor::{ExpirationInterceptor, ForceExpiration, with_decision};
pub use memory::MemoryBroker;
pub use region::{
    DeadLetterConfig, IndividualDeadLetterStrategy, RegionConfig, Regions,
    SharedDeadLetterStrategy, StaticRegion,
};
