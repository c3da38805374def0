use std::time::Duration;

use lapse_common::Destination;
use serde::{Deserialize, Serialize};

/// Start-up configuration for the expiration policy.
///
/// ```ron
/// (
///     zero_expiration_override_ms: 1800000,
///     process_network_messages: true,
///     destinations: ["queue://jobs.transient.>"],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Time to live given to matched messages that arrive without an expiration.
    ///
    /// Default: 3600000 (1 hour)
    #[serde(default = "defaults::zero_expiration_override_ms")]
    pub zero_expiration_override_ms: u64,

    /// Upper bound on time to live.
    ///
    /// Accepted and reported, but not consulted when deciding an expiration.
    /// Default: no ceiling
    #[serde(default)]
    pub ttl_ceiling_ms: Option<u64>,

    /// Never move an expiration backwards.
    ///
    /// Accepted and reported, but not consulted when deciding an expiration.
    /// Default: `false`
    #[serde(default)]
    pub future_only: bool,

    /// Also stamp messages that arrived over a broker-to-broker link.
    ///
    /// Default: `false`
    #[serde(default)]
    pub process_network_messages: bool,

    /// Destination patterns the policy applies to.
    ///
    /// Default: the `zocalo.transient.>` and `zocdev.transient.>` queues and topics
    #[serde(default = "defaults::destinations")]
    pub destinations: Vec<Destination>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            zero_expiration_override_ms: defaults::zero_expiration_override_ms(),
            ttl_ceiling_ms: None,
            future_only: false,
            process_network_messages: false,
            destinations: defaults::destinations(),
        }
    }
}

impl PolicyConfig {
    #[must_use]
    pub const fn zero_expiration_override(&self) -> Duration {
        Duration::from_millis(self.zero_expiration_override_ms)
    }

    #[must_use]
    pub fn ttl_ceiling(&self) -> Option<Duration> {
        self.ttl_ceiling_ms.map(Duration::from_millis)
    }
}

mod defaults {
    use lapse_common::Destination;

    pub const fn zero_expiration_override_ms() -> u64 {
        60 * 60 * 1000
    }

    pub fn destinations() -> Vec<Destination> {
        ["zocalo", "zocdev"]
            .into_iter()
            .flat_map(|root| {
                let name = format!("{root}.transient.>");
                [Destination::queue(name.clone()), Destination::topic(name)]
            })
            .collect()
    }
}
