/*
[INPUT]:  Line items of one file
[OUTPUT]: Which item keys go into the XML export
[POS]:    View-local state - discarded with the view that owns it
[UPDATE]: When changing default selection or grouping rules
*/

use std::collections::HashMap;

use specwise_client::{FileRecord, LineItem};

/// Checked/unchecked state per item key, seeded from extraction confidence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSelection {
    /// Item keys in file order
    order: Vec<String>,
    selected: HashMap<String, bool>,
    high_confidence: Vec<String>,
}

impl ItemSelection {
    /// High-confidence items start checked, everything else unchecked
    pub fn from_items(items: &[LineItem]) -> Self {
        let mut order = Vec::with_capacity(items.len());
        let mut selected = HashMap::with_capacity(items.len());
        let mut high_confidence = Vec::new();

        for item in items {
            let key = item.key().to_string();
            if selected.contains_key(&key) {
                continue;
            }
            if item.is_high_confidence() {
                high_confidence.push(key.clone());
            }
            selected.insert(key.clone(), item.is_high_confidence());
            order.push(key);
        }

        Self {
            order,
            selected,
            high_confidence,
        }
    }

    pub fn for_file(file: &FileRecord) -> Self {
        Self::from_items(&file.items)
    }

    /// Flip one item; unknown keys are ignored. Returns the new state.
    pub fn toggle(&mut self, key: &str) -> Option<bool> {
        let state = self.selected.get_mut(key)?;
        *state = !*state;
        Some(*state)
    }

    pub fn set(&mut self, key: &str, checked: bool) -> bool {
        match self.selected.get_mut(key) {
            Some(state) => {
                *state = checked;
                true
            }
            None => false,
        }
    }

    /// "Select all" / "Deselect all" over the high-confidence group
    pub fn set_all_high_confidence(&mut self, checked: bool) {
        for key in &self.high_confidence {
            self.selected.insert(key.clone(), checked);
        }
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.get(key).copied().unwrap_or(false)
    }

    /// Selected keys, in file order
    pub fn selected_keys(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|key| self.is_selected(key))
            .cloned()
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.values().filter(|checked| **checked).count()
    }

    pub fn total(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_count() == 0
    }
}

/// Split items into (high confidence, low confidence), preserving order
pub fn partition_by_confidence(items: &[LineItem]) -> (Vec<&LineItem>, Vec<&LineItem>) {
    items.iter().partition(|item| item.is_high_confidence())
}
