//! Queue and topic identities.
//!
//! A destination is a physical name plus its kind. Two destinations are equal
//! only when both agree, so `queue://a` and `topic://a` are distinct. The
//! qualified `kind://name` form is used everywhere a destination is written as
//! text (configuration, logs, the command line).

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::DestinationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DestinationKind {
    Queue,
    Topic,
    TempQueue,
    TempTopic,
}

impl DestinationKind {
    /// The scheme used in the qualified name, without `://`
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::Queue => "queue",
            Self::Topic => "topic",
            Self::TempQueue => "temp-queue",
            Self::TempTopic => "temp-topic",
        }
    }

    #[must_use]
    pub const fn is_queue(self) -> bool {
        matches!(self, Self::Queue | Self::TempQueue)
    }
}

impl FromStr for DestinationKind {
    type Err = DestinationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queue" => Ok(Self::Queue),
            "topic" => Ok(Self::Topic),
            "temp-queue" => Ok(Self::TempQueue),
            "temp-topic" => Ok(Self::TempTopic),
            other => Err(DestinationError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Destination {
    kind: DestinationKind,
    name: String,
}

impl Destination {
    #[must_use]
    pub fn new(kind: DestinationKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn queue(name: impl Into<String>) -> Self {
        Self::new(DestinationKind::Queue, name)
    }

    #[must_use]
    pub fn topic(name: impl Into<String>) -> Self {
        Self::new(DestinationKind::Topic, name)
    }

    #[must_use]
    pub const fn kind(&self) -> DestinationKind {
        self.kind
    }

    /// The physical name, without the kind prefix
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.kind.scheme(), self.name)
    }
}

impl FromStr for Destination {
    type Err = DestinationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, name) = s
            .split_once("://")
            .ok_or_else(|| DestinationError::MissingKind(s.to_string()))?;

        if name.is_empty() {
            return Err(DestinationError::EmptyName);
        }

        Ok(Self::new(scheme.parse()?, name))
    }
}

impl TryFrom<String> for Destination {
    type Error = DestinationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Destination> for String {
    fn from(value: Destination) -> Self {
        value.to_string()
    }
}
