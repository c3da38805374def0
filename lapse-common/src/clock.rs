//! Wall-clock source for expiration decisions.
//!
//! Broker timestamps are milliseconds since the Unix epoch, signed so that
//! zero and negative values can carry the "unset" meaning producers use.

use std::fmt::Debug;

/// Source of "now" in broker milliseconds
pub trait Clock: Send + Sync + Debug {
    fn now_millis(&self) -> i64;
}

/// The real wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock frozen at a single instant, for deterministic decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}
