//! String route patterns.
//!
//! Translates patterns like `/users/{id}/files/{path...}` into selector
//! sequences. Syntax per segment:
//!
//! - literal text: [`Selector::Constant`]
//! - `{name}`: [`Selector::Parameter`]
//! - `{name?}`: [`Selector::OptionalParameter`]
//! - `*`: [`Selector::Wildcard`]
//! - `{...}` / `{name...}`: [`Selector::Tailcard`] (anonymous or named)
//!
//! Redundant `/` separators collapse, so `//a///b/` parses like `/a/b`.

use crate::selector::Selector;
use keryx_core::ConfigError;

fn invalid(pattern: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.into(),
    }
}

/// Parses `pattern` into a root-to-leaf selector sequence.
pub fn parse_pattern(pattern: &str) -> Result<Vec<Selector>, ConfigError> {
    let mut selectors = Vec::new();
    for segment in pattern.split('/').filter(|segment| !segment.is_empty()) {
        if selectors.last().is_some_and(Selector::is_tailcard) {
            return Err(invalid(pattern, "segments may not follow a tailcard"));
        }
        selectors.push(parse_segment(pattern, segment)?);
    }
    Ok(selectors)
}

fn parse_segment(pattern: &str, segment: &str) -> Result<Selector, ConfigError> {
    if segment == "*" {
        return Ok(Selector::Wildcard);
    }
    if let Some(inner) = segment.strip_prefix('{') {
        let Some(inner) = inner.strip_suffix('}') else {
            return Err(invalid(pattern, format!("unclosed brace in '{segment}'")));
        };
        if inner.contains(['{', '}']) {
            return Err(invalid(pattern, format!("nested braces in '{segment}'")));
        }
        if let Some(name) = inner.strip_suffix("...") {
            let name = (!name.is_empty()).then(|| name.to_string());
            return Ok(Selector::Tailcard {
                name,
                min_segments: 0,
            });
        }
        if let Some(name) = inner.strip_suffix('?') {
            if name.is_empty() {
                return Err(invalid(pattern, "optional parameter needs a name"));
            }
            return Ok(Selector::OptionalParameter {
                name: name.to_string(),
            });
        }
        if inner.is_empty() {
            return Err(invalid(pattern, "parameter needs a name"));
        }
        return Ok(Selector::Parameter {
            name: inner.to_string(),
        });
    }
    if segment.contains(['{', '}']) {
        return Err(invalid(
            pattern,
            format!("braces must span a whole segment in '{segment}'"),
        ));
    }
    Ok(Selector::Constant(segment.to_string()))
}
