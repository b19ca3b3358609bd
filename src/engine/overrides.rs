// src/engine/overrides.rs

//! Manually entered rates, keyed by program slot.

use std::collections::{HashMap, HashSet};

use crate::models::SlotId;

/// Per-slot record of rates the user typed in.
///
/// A slot with an entry is overridden; removing the entry is the only way
/// back to a computed rate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideRegistry {
    entries: HashMap<SlotId, f64>,
}

impl OverrideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a manual rate, replacing any earlier one for the slot.
    pub fn set(&mut self, id: impl Into<SlotId>, value: f64) {
        self.entries.insert(id.into(), value);
    }

    /// Clear the override of a slot. Returns whether one was active.
    pub fn clear(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// The manual rate of a slot, if overridden.
    pub fn active(&self, id: &str) -> Option<f64> {
        self.entries.get(id).copied()
    }

    pub fn is_overridden(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Forget overrides of slots that are no longer in the snapshot.
    /// Returns how many were dropped.
    pub fn retain_ids(&mut self, present: &HashSet<&str>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| present.contains(id.as_str()));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear() {
        let mut registry = OverrideRegistry::new();
        registry.set("1", 550.0);
        assert_eq!(registry.active("1"), Some(550.0));
        assert!(registry.clear("1"));
        assert!(!registry.clear("1"));
        assert_eq!(registry.active("1"), None);
    }

    #[test]
    fn test_set_replaces_value() {
        let mut registry = OverrideRegistry::new();
        registry.set("1", 550.0);
        registry.set("1", 500.0);
        assert_eq!(registry.active("1"), Some(500.0));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_retain_ids_drops_missing_slots() {
        let mut registry = OverrideRegistry::new();
        registry.set("1", 10.0);
        registry.set("2", 20.0);
        registry.set("3", 30.0);

        let present: HashSet<&str> = ["2", "4"].into_iter().collect();
        assert_eq!(registry.retain_ids(&present), 2);
        assert!(registry.is_overridden("2"));
        assert!(!registry.is_overridden("1"));
        assert_eq!(registry.len(), 1);
    }
}
