//! Accept-style quality-list parsing for header selectors.
//!
//! Parses header values of the form `token; q=0.5, other/token` into weighted
//! alternatives. Parsing failures are split into two classes so the selector
//! layer can degrade gracefully: a bad `q` weight downgrades the match to
//! Missing, while a structurally unparsable list fails the branch outright.

use thiserror::Error;

/// One alternative from a quality-weighted header list.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    /// The media token, for example `text/html` or `*/*`.
    pub value: String,
    /// Its weight, `0.0..=1.0`, defaulting to `1.0` when unspecified.
    pub weight: f64,
}

/// Why a quality list could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NegotiationError {
    /// A `q` parameter was present but not a number in `0.0..=1.0`.
    #[error("invalid quality weight '{value}'")]
    BadWeight {
        /// The rejected weight text.
        value: String,
    },

    /// An alternative was structurally unparsable.
    #[error("malformed header alternative '{part}'")]
    Malformed {
        /// The rejected alternative text.
        part: String,
    },
}

/// Parses the concatenated values of one header as a quality list.
///
/// Each value may itself contain several comma-separated alternatives, per
/// HTTP list-header folding. Alternatives are returned in listed order; empty
/// items between commas are skipped.
pub fn parse_quality_list(values: &[String]) -> Result<Vec<Alternative>, NegotiationError> {
    let mut alternatives = Vec::new();
    for value in values {
        for item in value.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            alternatives.push(parse_alternative(item)?);
        }
    }
    Ok(alternatives)
}

fn parse_alternative(item: &str) -> Result<Alternative, NegotiationError> {
    let mut parts = item.split(';');
    let token = parts.next().unwrap_or("").trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(NegotiationError::Malformed {
            part: item.to_string(),
        });
    }

    let mut weight = 1.0;
    for parameter in parts {
        let parameter = parameter.trim();
        let Some((name, value)) = parameter.split_once('=') else {
            return Err(NegotiationError::Malformed {
                part: item.to_string(),
            });
        };
        if name.trim().eq_ignore_ascii_case("q") {
            let value = value.trim();
            weight = value.parse::<f64>().ok().filter(|q| (0.0..=1.0).contains(q)).ok_or(
                NegotiationError::BadWeight {
                    value: value.to_string(),
                },
            )?;
        }
        // Other parameters (charset, level) do not affect routing.
    }

    Ok(Alternative {
        value: token.to_string(),
        weight,
    })
}

/// Matches a listed alternative against an expected media token.
///
/// Both sides are split on `/`; a `*` on either side matches any part, and a
/// bare `*` alternative matches anything. Comparison is ASCII
/// case-insensitive, per media-type rules.
#[must_use]
pub fn media_match(candidate: &str, expected: &str) -> bool {
    if candidate == "*" || expected == "*" {
        return true;
    }
    let candidate_parts: Vec<&str> = candidate.split('/').collect();
    let expected_parts: Vec<&str> = expected.split('/').collect();
    if candidate_parts.len() != expected_parts.len() {
        return false;
    }
    candidate_parts
        .iter()
        .zip(&expected_parts)
        .all(|(c, e)| *c == "*" || *e == "*" || c.eq_ignore_ascii_case(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(header: &str) -> Vec<Alternative> {
        parse_quality_list(&[header.to_string()]).unwrap()
    }

    #[test]
    fn test_single_token_defaults_to_full_weight() {
        let alternatives = parse_one("text/plain");
        assert_eq!(alternatives.len(), 1);
        assert_eq!(alternatives[0].value, "text/plain");
        assert!((alternatives[0].weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_comma_list_with_weights() {
        let alternatives = parse_one("text/plain, text/html; q=0.5");
        assert_eq!(alternatives.len(), 2);
        assert_eq!(alternatives[1].value, "text/html");
        assert!((alternatives[1].weight - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_list_folded_across_header_values() {
        let values = vec!["text/plain".to_string(), "text/html; q=0.2".to_string()];
        let alternatives = parse_quality_list(&values).unwrap();
        assert_eq!(alternatives.len(), 2);
    }

    #[test]
    fn test_non_quality_parameters_ignored() {
        let alternatives = parse_one("text/html; charset=utf-8; q=0.9");
        assert_eq!(alternatives[0].value, "text/html");
        assert!((alternatives[0].weight - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bad_weight_is_distinguished() {
        let err = parse_quality_list(&["text/html; q=banana".to_string()]).unwrap_err();
        assert!(matches!(err, NegotiationError::BadWeight { .. }));

        let err = parse_quality_list(&["text/html; q=1.5".to_string()]).unwrap_err();
        assert!(matches!(err, NegotiationError::BadWeight { .. }));
    }

    #[test]
    fn test_malformed_alternative() {
        let err = parse_quality_list(&["text html".to_string()]).unwrap_err();
        assert!(matches!(err, NegotiationError::Malformed { .. }));

        let err = parse_quality_list(&["text/html; q".to_string()]).unwrap_err();
        assert!(matches!(err, NegotiationError::Malformed { .. }));
    }

    #[test]
    fn test_empty_items_skipped() {
        let alternatives = parse_one("text/plain,, ");
        assert_eq!(alternatives.len(), 1);
    }

    #[test]
    fn test_media_match_wildcards() {
        assert!(media_match("*/*", "application/json"));
        assert!(media_match("application/*", "application/json"));
        assert!(media_match("*", "anything"));
        assert!(media_match("Application/JSON", "application/json"));
        assert!(!media_match("text/*", "application/json"));
        assert!(!media_match("text", "text/html"));
    }
}
