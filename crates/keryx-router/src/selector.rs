//! Route selectors: per-segment and per-attribute matching rules.
//!
//! A selector is evaluated against one position of the decoded path (or
//! against the call's headers or query parameters) and reports one of three
//! outcomes: the element was absent ([`Evaluation::Missing`]), present but
//! unacceptable ([`Evaluation::Failed`]), or matched with a quality score and
//! zero or more captured values ([`Evaluation::Success`]).
//!
//! Selectors are created at registration time and immutable afterwards.

use crate::negotiation::{media_match, parse_quality_list, NegotiationError};
use crate::quality::Quality;
use keryx_core::{CallAttributes, ValueMap};
use std::fmt;

/// Outcome of evaluating one selector at one position.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// The element was present but did not match; the branch is discarded.
    Failed,
    /// The element was absent; optional-style branches continue at zero
    /// quality without consuming or capturing anything.
    Missing,
    /// The selector matched.
    Success(SelectorMatch),
}

/// A successful selector match.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorMatch {
    /// Quality of this match, used to rank competing siblings.
    pub quality: Quality,
    /// Values captured by this selector.
    pub captures: ValueMap,
    /// How many path segments the selector consumed.
    pub segment_increment: usize,
}

impl SelectorMatch {
    fn plain(quality: Quality, segment_increment: usize) -> Evaluation {
        Evaluation::Success(Self {
            quality,
            captures: ValueMap::new(),
            segment_increment,
        })
    }

    fn capturing(quality: Quality, captures: ValueMap, segment_increment: usize) -> Evaluation {
        Evaluation::Success(Self {
            quality,
            captures,
            segment_increment,
        })
    }
}

/// A routing tree selector.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// The tree root, consuming the configured constant path prefix.
    Root {
        /// Prefix segments stripped before any other matching.
        prefix: Vec<String>,
    },
    /// An exact, case-sensitive segment literal.
    Constant(String),
    /// A required single-segment capture.
    Parameter {
        /// Name the captured segment is stored under.
        name: String,
    },
    /// A single-segment capture that also matches absence.
    OptionalParameter {
        /// Name the captured segment is stored under when present.
        name: String,
    },
    /// An anonymous selector consuming exactly one segment.
    Wildcard,
    /// Consumes all remaining segments from its position to the end.
    Tailcard {
        /// Capture name; anonymous tailcards capture nothing.
        name: Option<String>,
        /// Minimum number of trailing segments required.
        min_segments: usize,
    },
    /// Matches a header parsed as an Accept-style quality list.
    HeaderQuality {
        /// Header name (case-insensitive).
        header: String,
        /// Expected media token, matched against the listed alternatives.
        value: String,
    },
    /// Matches when the named query parameter is present, capturing its values.
    QueryParameter {
        /// Query parameter name.
        name: String,
    },
    /// Matches when the named query parameter carries a specific value.
    ConstantQueryParameter {
        /// Query parameter name.
        name: String,
        /// Required value.
        value: String,
    },
}

impl Selector {
    /// Evaluates this selector at `index` of the decoded `segments`.
    ///
    /// Segment-consuming selectors advance the index by their reported
    /// increment; header and query selectors never consume segments.
    #[must_use]
    pub fn evaluate(
        &self,
        attributes: &CallAttributes,
        segments: &[String],
        index: usize,
    ) -> Evaluation {
        match self {
            Self::Root { prefix } => evaluate_root(prefix, segments, index),
            Self::Constant(literal) => match segments.get(index) {
                Some(segment) if segment == literal => {
                    SelectorMatch::plain(Quality::CONSTANT, 1)
                }
                _ => Evaluation::Failed,
            },
            Self::Parameter { name } => match segments.get(index) {
                Some(segment) => {
                    let mut captures = ValueMap::new();
                    captures.push(name, segment.clone());
                    SelectorMatch::capturing(Quality::PARAMETER, captures, 1)
                }
                // An absent required segment fails the whole alternative.
                None => Evaluation::Failed,
            },
            Self::OptionalParameter { name } => match segments.get(index) {
                Some(segment) => {
                    let mut captures = ValueMap::new();
                    captures.push(name, segment.clone());
                    SelectorMatch::capturing(Quality::OPTIONAL_PARAMETER, captures, 1)
                }
                None => Evaluation::Missing,
            },
            Self::Wildcard => match segments.get(index) {
                Some(_) => SelectorMatch::plain(Quality::WILDCARD, 1),
                None => Evaluation::Failed,
            },
            Self::Tailcard { name, min_segments } => {
                let remaining = segments.len().saturating_sub(index);
                if remaining < *min_segments {
                    return Evaluation::Failed;
                }
                let mut captures = ValueMap::new();
                if let Some(name) = name {
                    // Zero trailing segments still declare the name, so the
                    // capture reads as an empty sequence rather than absent.
                    captures.declare(name);
                    for segment in &segments[index..] {
                        captures.push(name, segment.clone());
                    }
                }
                let quality = if remaining == 0 {
                    Quality::MISSING
                } else {
                    Quality::TAILCARD
                };
                SelectorMatch::capturing(quality, captures, remaining)
            }
            Self::HeaderQuality { header, value } => {
                evaluate_header_quality(attributes, header, value)
            }
            Self::QueryParameter { name } => {
                let values = attributes.query.get_all(name);
                if values.is_empty() {
                    return Evaluation::Missing;
                }
                let mut captures = ValueMap::new();
                for value in values {
                    captures.push(name, value.clone());
                }
                SelectorMatch::capturing(Quality::attribute(1.0), captures, 0)
            }
            Self::ConstantQueryParameter { name, value } => {
                if attributes.query.contains_value(name, value) {
                    SelectorMatch::plain(Quality::CONSTANT, 0)
                } else {
                    Evaluation::Failed
                }
            }
        }
    }

    /// Returns true for selectors that may only terminate or continue a
    /// branch by consuming everything behind them.
    #[must_use]
    pub fn is_tailcard(&self) -> bool {
        matches!(self, Self::Tailcard { .. })
    }
}

fn evaluate_root(prefix: &[String], segments: &[String], index: usize) -> Evaluation {
    let end = index + prefix.len();
    if end > segments.len() {
        return Evaluation::Failed;
    }
    if segments[index..end] != *prefix {
        return Evaluation::Failed;
    }
    SelectorMatch::plain(Quality::CONSTANT, prefix.len())
}

fn evaluate_header_quality(
    attributes: &CallAttributes,
    header: &str,
    expected: &str,
) -> Evaluation {
    let values = attributes.headers.get_all(header);
    if values.is_empty() {
        return Evaluation::Missing;
    }
    let alternatives = match parse_quality_list(values) {
        Ok(alternatives) => alternatives,
        // A bad weight degrades to Missing; a structurally broken list
        // fails the branch for safety.
        Err(NegotiationError::BadWeight { .. }) => return Evaluation::Missing,
        Err(NegotiationError::Malformed { .. }) => return Evaluation::Failed,
    };
    if alternatives.is_empty() {
        return Evaluation::Missing;
    }

    let best = alternatives
        .iter()
        .filter(|alternative| media_match(&alternative.value, expected))
        .map(|alternative| alternative.weight)
        .fold(None, |best: Option<f64>, weight| match best {
            Some(current) if current.total_cmp(&weight).is_ge() => Some(current),
            _ => Some(weight),
        });
    match best {
        Some(weight) => SelectorMatch::plain(Quality::attribute(weight), 0),
        None => Evaluation::Failed,
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root { prefix } => {
                if prefix.is_empty() {
                    write!(f, "")
                } else {
                    write!(f, "{}", prefix.join("/"))
                }
            }
            Self::Constant(literal) => write!(f, "{literal}"),
            Self::Parameter { name } => write!(f, "{{{name}}}"),
            Self::OptionalParameter { name } => write!(f, "{{{name}?}}"),
            Self::Wildcard => write!(f, "*"),
            Self::Tailcard { name, .. } => match name {
                Some(name) => write!(f, "{{{name}...}}"),
                None => write!(f, "{{...}}"),
            },
            Self::HeaderQuality { header, value } => {
                write!(f, "(header:{header} = {value})")
            }
            Self::QueryParameter { name } => write!(f, "(query:{name})"),
            Self::ConstantQueryParameter { name, value } => {
                write!(f, "(query:{name} = {value})")
            }
        }
    }
}
