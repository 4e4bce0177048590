//! Match quality: selector-kind rank plus content-negotiation weight.
//!
//! Competing sibling selectors are ordered by a two-part score. The kind
//! rank is the primary key: a constant literal always beats a parameter,
//! which beats an optional parameter, and so on down to tailcards. The
//! floating-point weight (an Accept-style `q` value) is compared only
//! between selectors of the same rank; a high-quality wildcard can never
//! outrank a low-quality parameter.

use std::cmp::Ordering;

/// Structural rank of a selector match, ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Rank {
    /// An optional element was absent; the branch continues at zero quality.
    Missing = 0,
    /// A tailcard consumed trailing segments.
    Tailcard = 1,
    /// An anonymous wildcard consumed one segment.
    Wildcard = 2,
    /// An optional parameter matched a present segment.
    OptionalParameter = 3,
    /// A required parameter matched a segment.
    Parameter = 4,
    /// A non-path attribute (header or query parameter) matched.
    Attribute = 5,
    /// A constant literal matched exactly.
    Constant = 6,
}

/// The quality of one selector match.
#[derive(Debug, Clone, Copy)]
pub struct Quality {
    /// Primary sort key: the structural rank.
    pub rank: Rank,
    /// Secondary key: negotiation weight in `0.0..=1.0`.
    pub weight: f64,
}

impl Quality {
    /// Quality of an absent optional element.
    pub const MISSING: Self = Self::new(Rank::Missing, 0.0);
    /// Quality of a tailcard consuming at least one segment.
    pub const TAILCARD: Self = Self::new(Rank::Tailcard, 1.0);
    /// Quality of a wildcard segment match.
    pub const WILDCARD: Self = Self::new(Rank::Wildcard, 1.0);
    /// Quality of a present optional parameter.
    pub const OPTIONAL_PARAMETER: Self = Self::new(Rank::OptionalParameter, 1.0);
    /// Quality of a required parameter match.
    pub const PARAMETER: Self = Self::new(Rank::Parameter, 1.0);
    /// Quality of a constant literal match.
    pub const CONSTANT: Self = Self::new(Rank::Constant, 1.0);

    /// Creates a quality score.
    #[must_use]
    pub const fn new(rank: Rank, weight: f64) -> Self {
        Self { rank, weight }
    }

    /// Quality of a header or query attribute match with weight `q`.
    #[must_use]
    pub const fn attribute(weight: f64) -> Self {
        Self::new(Rank::Attribute, weight)
    }
}

impl PartialEq for Quality {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Quality {}

impl PartialOrd for Quality {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quality {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.weight.total_cmp(&other.weight))
    }
}
