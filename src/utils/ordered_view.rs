// src/utils/ordered_view.rs
//! Sorted iteration over string-keyed maps.

use std::collections::HashMap;

/// Borrowed view of a map whose keys iterate in ascending byte order,
/// whatever order the underlying `HashMap` happens to use.
pub struct OrderedView<'a, V> {
    map: &'a HashMap<String, V>,
    keys: Vec<&'a str>,
}

impl<'a, V> OrderedView<'a, V> {
    /// Collects and sorts the keys of `map`. The map itself is borrowed, not copied.
    pub fn new(map: &'a HashMap<String, V>) -> Self {
        let mut keys: Vec<&'a str> = map.keys().map(String::as_str).collect();
        keys.sort_unstable();
        OrderedView { map, keys }
    }

    /// Keys in ascending byte order.
    pub fn keys(&self) -> &[&'a str] {
        &self.keys
    }

    /// Looks up `key` in the underlying map.
    pub fn get(&self, key: &str) -> Option<&'a V> {
        self.map.get(key)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a V)> + '_ {
        let map = self.map;
        self.keys.iter().filter_map(move |&key| map.get(key).map(|v| (key, v)))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// `true` when the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_basic_keys() {
        let m = map_of(&[("y", "1"), ("z", "2"), ("a", "3")]);
        assert_eq!(OrderedView::new(&m).keys(), &["a", "y", "z"]);
    }

    #[test]
    fn test_mixed_case_keys() {
        // Uppercase sorts before lowercase in byte order
        let m = map_of(&[("y", "1"), ("Z", "2"), ("z", "3"), ("a", "3")]);
        assert_eq!(OrderedView::new(&m).keys(), &["Z", "a", "y", "z"]);
    }

    #[test]
    fn test_iter_pairs_values_with_keys() {
        let m = map_of(&[("b", "2"), ("a", "1")]);
        let view = OrderedView::new(&m);
        let pairs: Vec<_> = view.iter().map(|(k, v)| (k, v.as_str())).collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
        assert_eq!(view.get("b").map(String::as_str), Some("2"));
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_empty_map() {
        let m: HashMap<String, String> = HashMap::new();
        let view = OrderedView::new(&m);
        assert!(view.is_empty());
        assert_eq!(view.iter().count(), 0);
    }
}
