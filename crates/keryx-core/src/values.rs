//! Captured route parameter storage.
//!
//! Uses a small-vector of `(name, values)` pairs: route matches rarely
//! capture more than a handful of parameters, so lookups stay linear and
//! allocation-free in the common case.

use smallvec::SmallVec;

/// Parameters stored inline before spilling to the heap.
const INLINE_ENTRIES: usize = 4;

/// Parameters captured along a resolved route path.
///
/// An ordered multimap: entry order is first-declaration order, and a name
/// declared by several selectors along the path accumulates its values in
/// match order. A tailcard that consumed zero segments still declares its
/// name with an empty value list, so `get_all` distinguishes "matched with
/// nothing" from "never declared".
///
/// # Example
///
/// ```rust
/// use keryx_core::ValueMap;
///
/// let mut values = ValueMap::new();
/// values.push("org", "acme");
/// values.push("items", "a");
/// values.push("items", "b");
///
/// assert_eq!(values.get("org"), Some("acme"));
/// assert_eq!(values.get_all("items"), Some(&["a".to_string(), "b".to_string()][..]));
/// assert_eq!(values.get_all("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueMap {
    entries: SmallVec<[(String, Vec<String>); INLINE_ENTRIES]>,
}

impl ValueMap {
    /// Creates an empty value map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, name: &str) -> &mut Vec<String> {
        if let Some(index) = self.entries.iter().position(|(n, _)| n == name) {
            &mut self.entries[index].1
        } else {
            self.entries.push((name.to_string(), Vec::new()));
            &mut self.entries.last_mut().unwrap().1
        }
    }

    /// Declares `name` without adding a value.
    ///
    /// Used by selectors that matched but captured nothing (a tailcard over
    /// zero trailing segments).
    pub fn declare(&mut self, name: impl AsRef<str>) {
        let _ = self.entry(name.as_ref());
    }

    /// Appends a captured value under `name`.
    pub fn push(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entry(name.as_ref()).push(value.into());
    }

    /// Merges another map into this one, preserving declaration order.
    pub fn merge(&mut self, other: &ValueMap) {
        for (name, values) in &other.entries {
            let entry = self.entry(name);
            entry.extend(values.iter().cloned());
        }
    }

    /// Returns the first value captured under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).and_then(|values| {
            values.first().map(String::as_str)
        })
    }

    /// Returns all values for `name`, or `None` if the name was never declared.
    ///
    /// A declared-but-empty capture returns `Some(&[])`.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Returns true if `name` was declared by any selector on the path.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Returns the number of declared names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no names were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, values)` in declaration order.
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
    fn test_push_and_get() {
        let mut values = ValueMap::new();
        values.push("id", "42");

        assert_eq!(values.get("id"), Some("42"));
        assert_eq!(values.get("other"), None);
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_repeated_name_accumulates() {
        let mut values = ValueMap::new();
        values.push("seg", "a");
        values.push("seg", "b");

        assert_eq!(values.get("seg"), Some("a"));
        assert_eq!(values.get_all("seg").unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_declare_without_values() {
        let mut values = ValueMap::new();
        values.declare("items");

        assert!(values.contains("items"));
        assert_eq!(values.get_all("items"), Some(&[][..]));
        assert_eq!(values.get("items"), None);
    }

    #[test]
    fn test_undeclared_is_none_not_empty() {
        let values = ValueMap::new();
        assert_eq!(values.get_all("items"), None);
        assert!(!values.contains("items"));
    }

    #[test]
    fn test_declaration_order_preserved() {
        let mut values = ValueMap::new();
        values.push("first", "1");
        values.push("second", "2");
        values.push("first", "1b");

        let names: Vec<&str> = values.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn test_merge_preserves_order_and_accumulates() {
        let mut left = ValueMap::new();
        left.push("a", "1");

        let mut right = ValueMap::new();
        right.push("a", "2");
        right.push("b", "3");
        right.declare("tail");

        left.merge(&right);
        assert_eq!(left.get_all("a").unwrap(), ["1", "2"]);
        assert_eq!(left.get("b"), Some("3"));
        assert_eq!(left.get_all("tail"), Some(&[][..]));

        let names: Vec<&str> = left.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "b", "tail"]);
    }
}
