use ahash::AHashMap;
use itertools::Itertools;
use std::hash::Hash;

/// Frequency counter that remembers first-seen order.
///
/// Every "most frequent X" in the analysis goes through this type, so ties
/// always resolve to the key that was seen first.
#[derive(Debug, Clone)]
pub struct OrderedTally<K> {
    index: AHashMap<K, usize>,
    entries: Vec<(K, usize)>,
}

impl<K> Default for OrderedTally<K> {
    fn default() -> Self {
        Self { index: AHashMap::new(), entries: Vec::new() }
    }
}

impl<K: Eq + Hash + Clone> OrderedTally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn count(&self, key: &K) -> usize {
        self.index.get(key).map(|&slot| self.entries[slot].1).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most frequent key; the earliest seen wins a tie.
    pub fn mode(&self) -> Option<(&K, usize)> {
        let mut best: Option<(&K, usize)> = None;
        for (k, c) in &self.entries {
            if best.map_or(true, |(_, b)| *c > b) {
                best = Some((k, *c));
            }
        }
        best
    }

    /// Up to `n` keys by descending count, ties in first-seen order.
    pub fn top(&self, n: usize) -> Vec<(&K, usize)> {
        self.entries
            .iter()
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .take(n)
            .map(|(k, c)| (k, *c))
            .collect()
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for OrderedTally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut t = OrderedTally::new();
        for k in iter {
            t.add(k);
        }
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_prefers_first_seen_on_tie() {
        let t: OrderedTally<&str> = ["b", "a", "a", "b", "c"].into_iter().collect();
        assert_eq!(t.mode(), Some((&"b", 2)));
        assert_eq!(t.count(&"a"), 2);
        assert_eq!(t.count(&"zzz"), 0);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn top_is_stable_and_truncated() {
        let t: OrderedTally<&str> = ["x", "y", "z", "z", "y", "w"].into_iter().collect();
        assert_eq!(t.top(2), vec![(&"y", 2), (&"z", 2)]);
        assert_eq!(t.top(10).len(), 4);
        assert_eq!(t.top(10)[2], (&"x", 1));
    }

    #[test]
    fn empty_tally_has_no_mode() {
        let t: OrderedTally<String> = OrderedTally::new();
        assert!(t.is_empty());
        assert!(t.mode().is_none());
        assert!(t.top(3).is_empty());
    }
}
