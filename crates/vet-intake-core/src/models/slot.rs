//! Candidate visit times and the client's ranking of them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A proposed appointment instant. Never mutated once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CandidateSlot {
    /// RFC 3339 timestamp, rounded to a 5-minute boundary
    pub iso: String,
    /// Human-readable form shown on the page
    pub display: String,
}

/// Client-assigned ranks over recommended slots, keyed by ISO timestamp.
///
/// Ranks are always exactly `1..=len()`: removing a slot shifts every later
/// rank down by one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotPreferences {
    ranks: BTreeMap<String, u32>,
}

impl SlotPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn rank_of(&self, iso: &str) -> Option<u32> {
        self.ranks.get(iso).copied()
    }

    pub fn contains(&self, iso: &str) -> bool {
        self.ranks.contains_key(iso)
    }

    /// Add a slot at the next rank. Returns the rank it holds afterwards.
    pub fn select(&mut self, iso: &str) -> u32 {
        if let Some(rank) = self.rank_of(iso) {
            return rank;
        }
        let rank = self.ranks.len() as u32 + 1;
        self.ranks.insert(iso.to_string(), rank);
        rank
    }

    /// Remove a slot and close the gap it leaves.
    pub fn deselect(&mut self, iso: &str) -> bool {
        let Some(removed) = self.ranks.remove(iso) else {
            return false;
        };
        for rank in self.ranks.values_mut() {
            if *rank > removed {
                *rank -= 1;
            }
        }
        true
    }

    /// Select if absent, deselect if present. Returns true when now selected.
    pub fn toggle(&mut self, iso: &str) -> bool {
        if self.deselect(iso) {
            false
        } else {
            self.select(iso);
            true
        }
    }

    /// Keep only slots accepted by `keep`, renumbering in existing rank order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        let kept: Vec<String> = self
            .ordered()
            .into_iter()
            .filter(|(_, iso)| keep(iso))
            .map(|(_, iso)| iso)
            .collect();
        self.ranks = kept
            .into_iter()
            .enumerate()
            .map(|(i, iso)| (iso, i as u32 + 1))
            .collect();
    }

    pub fn clear(&mut self) {
        self.ranks.clear();
    }

    /// `(rank, iso)` pairs sorted by rank.
    pub fn ordered(&self) -> Vec<(u32, String)> {
        let mut pairs: Vec<(u32, String)> = self
            .ranks
            .iter()
            .map(|(iso, rank)| (*rank, iso.clone()))
            .collect();
        pairs.sort();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_assigns_next_rank() {
        let mut prefs = SlotPreferences::new();
        assert_eq!(prefs.select("a"), 1);
        assert_eq!(prefs.select("b"), 2);
        assert_eq!(prefs.select("a"), 1);
        assert_eq!(prefs.len(), 2);
    }

    #[test]
    fn test_deselect_closes_gap() {
        let mut prefs = SlotPreferences::new();
        prefs.select("a");
        prefs.select("b");
        prefs.select("c");

        assert!(prefs.deselect("a"));
        assert_eq!(prefs.rank_of("b"), Some(1));
        assert_eq!(prefs.rank_of("c"), Some(2));
        assert!(!prefs.deselect("a"));
    }

    #[test]
    fn test_retain_renumbers_in_rank_order() {
        let mut prefs = SlotPreferences::new();
        prefs.select("z");
        prefs.select("a");
        prefs.select("m");

        prefs.retain(|iso| iso != "z");
        assert_eq!(prefs.ordered(), vec![(1, "a".to_string()), (2, "m".to_string())]);
    }
}
