//! Hierarchical wildcard matching over destination names.
//!
//! Names are split on `.` into segments. In a pattern, `*` matches exactly one
//! segment and `>` matches whatever remains, including nothing, so
//! `zocalo.transient.>` matches `zocalo.transient` as well as
//! `zocalo.transient.a.b`. `>` is only valid as the final segment.
//!
//! A filter carries the destination kind of its pattern and never matches a
//! destination of another kind.

use std::fmt::{self, Display};

use lapse_common::{Destination, DestinationKind};

use crate::error::PolicyError;

const SEPARATOR: char = '.';
const ANY: &str = "*";
const REST: &str = ">";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
    Rest,
}

impl Segment {
    fn matches(&self, segment: &str) -> bool {
        match self {
            Self::Literal(literal) => literal == segment,
            Self::Any | Self::Rest => true,
        }
    }
}

/// A compiled destination pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationFilter {
    pattern: Destination,
    segments: Vec<Segment>,
}

impl DestinationFilter {
    /// Compile a pattern such as `queue://zocalo.transient.>`
    ///
    /// # Errors
    /// Returns [`PolicyError::InvalidPattern`] when the name has an empty
    /// segment or a `>` anywhere but last.
    pub fn parse(pattern: &Destination) -> Result<Self, PolicyError> {
        let invalid = |reason: &str| PolicyError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let parts = pattern.name().split(SEPARATOR).collect::<Vec<_>>();
        let last = parts.len() - 1;

        let segments = parts
            .iter()
            .enumerate()
            .map(|(index, part)| match *part {
                "" => Err(invalid("empty segment")),
                ANY => Ok(Segment::Any),
                REST if index == last => Ok(Segment::Rest),
                REST => Err(invalid("'>' must be the last segment")),
                literal => Ok(Segment::Literal(literal.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            pattern: pattern.clone(),
            segments,
        })
    }

    #[must_use]
    pub const fn kind(&self) -> DestinationKind {
        self.pattern.kind()
    }

    #[must_use]
    pub fn matches(&self, destination: &Destination) -> bool {
        if destination.kind() != self.kind() {
            return false;
        }

        let path = destination.name().split(SEPARATOR).collect::<Vec<_>>();

        match self.segments.split_last() {
            Some((Segment::Rest, prefix)) => {
                path.len() >= prefix.len()
                    && prefix.iter().zip(&path).all(|(seg, part)| seg.matches(part))
            }
            _ => {
                path.len() == self.segments.len()
                    && self
                        .segments
                        .iter()
                        .zip(&path)
                        .all(|(seg, part)| seg.matches(part))
            }
        }
    }
}

impl Display for DestinationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pattern.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(pattern: &str) -> DestinationFilter {
        let destination = pattern.parse::<Destination>().unwrap_or_else(|e| panic!("{e}"));
        DestinationFilter::parse(&destination).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn test_rest_matches_prefix_and_descendants() {
        let transient = filter("queue://zocalo.transient.>");

        assert!(transient.matches(&Destination::queue("zocalo.transient")));
        assert!(transient.matches(&Destination::queue("zocalo.transient.work")));
        assert!(transient.matches(&Destination::queue("zocalo.transient.a.b.c")));

        assert!(!transient.matches(&Destination::queue("zocalo")));
        assert!(!transient.matches(&Destination::queue("zocalo.durable.work")));
        assert!(!transient.matches(&Destination::queue("zocdev.transient.work")));
        assert!(!transient.matches(&Destination::queue("zocalo.transientish.work")));
    }

    #[test]
    fn test_kind_must_agree() {
        let transient = filter("queue://zocalo.transient.>");

        assert!(!transient.matches(&Destination::topic("zocalo.transient.work")));
        assert!(!transient.matches(&Destination::new(
            DestinationKind::TempQueue,
            "zocalo.transient.work"
        )));
    }

    #[test]
    fn test_any_matches_exactly_one_segment() {
        let any = filter("topic://a.*.c");

        assert!(any.matches(&Destination::topic("a.b.c")));
        assert!(any.matches(&Destination::topic("a.x.c")));
        assert!(!any.matches(&Destination::topic("a.c")));
        assert!(!any.matches(&Destination::topic("a.b.b.c")));
    }

    #[test]
    fn test_literal_pattern_is_equality() {
        let exact = filter("queue://a.b");

        assert!(exact.matches(&Destination::queue("a.b")));
        assert!(!exact.matches(&Destination::queue("a.b.c")));
        assert!(!exact.matches(&Destination::queue("a")));
    }

    #[test]
    fn test_bare_rest_matches_everything_of_kind() {
        let all = filter("queue://>");

        assert!(all.matches(&Destination::queue("anything.at.all")));
        assert!(!all.matches(&Destination::topic("anything")));
    }

    #[test]
    fn test_invalid_patterns_are_rejected() {
        let rest_in_middle = DestinationFilter::parse(&Destination::queue("a.>.b"));
        assert!(matches!(
            rest_in_middle,
            Err(PolicyError::InvalidPattern { ref reason, .. }) if reason.contains("last segment")
        ));

        let empty_segment = DestinationFilter::parse(&Destination::queue("a..b"));
        assert!(matches!(
            empty_segment,
            Err(PolicyError::InvalidPattern { ref reason, .. }) if reason == "empty segment"
        ));

        assert!(DestinationFilter::parse(&Destination::queue("a.")).is_err());
    }

    #[test]
    fn test_display_is_pattern() {
        assert_eq!(
            filter("topic://zocdev.transient.>").to_string(),
            "topic://zocdev.transient.>"
        );
    }
}
