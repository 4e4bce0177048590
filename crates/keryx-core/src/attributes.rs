//! Ordered multi-value string maps for call attributes.
//!
//! Headers and query parameters are both name → many-values mappings. This
//! module backs them with an insertion-ordered map so that iteration (and
//! therefore routing resolution) is deterministic, never dependent on hash
//! iteration order.

use indexmap::IndexMap;

/// An ordered, multi-value mapping from attribute names to string values.
///
/// Used for request headers (case-insensitive) and query parameters
/// (case-sensitive). Entry order is insertion order; values within an entry
/// preserve append order.
///
/// # Example
///
/// ```rust
/// use keryx_core::AttributeMap;
///
/// let mut headers = AttributeMap::case_insensitive();
/// headers.append("Accept", "text/html");
/// headers.append("accept", "application/json");
///
/// assert_eq!(headers.get("ACCEPT"), Some("text/html"));
/// assert_eq!(headers.get_all("accept").len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: IndexMap<String, Vec<String>>,
    fold_case: bool,
}

impl AttributeMap {
    /// Creates an empty case-sensitive map (query parameters).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty case-insensitive map (headers).
    ///
    /// Names are folded to lowercase on insert and lookup.
    #[must_use]
    pub fn case_insensitive() -> Self {
        Self {
            entries: IndexMap::new(),
            fold_case: true,
        }
    }

    fn fold(&self, name: &str) -> String {
        if self.fold_case {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Appends a value under `name`, preserving existing values.
    pub fn append(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let key = self.fold(name.as_ref());
        self.entries.entry(key).or_default().push(value.into());
    }

    /// Returns the first value for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&self.fold(name))
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns all values for `name` in append order.
    ///
    /// Returns an empty slice when the name is absent.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .get(&self.fold(name))
            .map_or(&[], Vec::as_slice)
    }

    /// Returns true if `name` has at least one value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&self.fold(name))
    }

    /// Returns true if `name` carries exactly this `value` among its values.
    #[must_use]
    pub fn contains_value(&self, name: &str, value: &str) -> bool {
        self.get_all(name).iter().any(|v| v == value)
    }

    /// Returns the number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, values)` entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_get() {
        let mut map = AttributeMap::new();
        map.append("page", "1");
        map.append("sort", "name");

        assert_eq!(map.get("page"), Some("1"));
        assert_eq!(map.get("sort"), Some("name"));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_multi_value_order() {
        let mut map = AttributeMap::new();
        map.append("tag", "a");
        map.append("tag", "b");
        map.append("tag", "c");

        assert_eq!(map.get("tag"), Some("a"));
        assert_eq!(map.get_all("tag"), ["a", "b", "c"]);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut headers = AttributeMap::case_insensitive();
        headers.append("Content-Type", "text/plain");

        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
        assert!(headers.contains("Content-type"));
    }

    #[test]
    fn test_case_sensitive_by_default() {
        let mut query = AttributeMap::new();
        query.append("Key", "v");

        assert_eq!(query.get("Key"), Some("v"));
        assert_eq!(query.get("key"), None);
    }

    #[test]
    fn test_contains_value() {
        let mut map = AttributeMap::new();
        map.append("mode", "fast");
        map.append("mode", "safe");

        assert!(map.contains_value("mode", "safe"));
        assert!(!map.contains_value("mode", "slow"));
    }

    #[test]
    fn test_iteration_is_insertion_ordered() {
        let mut map = AttributeMap::new();
        map.append("z", "1");
        map.append("a", "2");
        map.append("m", "3");

        let names: Vec<&str> = map.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn test_get_all_absent_is_empty() {
        let map = AttributeMap::new();
        assert!(map.get_all("nothing").is_empty());
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }
}
