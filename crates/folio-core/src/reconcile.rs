//! Generic keyed reconciliation.
//!
//! The overlay renderers diff their current visual maps against freshly
//! computed ones and apply only the difference, which is what lets them be
//! called from any trigger, any number of times, without flicker. The diff
//! itself has no UI types in it so it can be exercised headlessly.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedDiff<K> {
    pub added: Vec<K>,
    pub removed: Vec<K>,
    pub updated: Vec<K>,
}

impl<K> Default for KeyedDiff<K> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
            updated: Vec::new(),
        }
    }
}

impl<K> KeyedDiff<K> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

/// Compare two keyed collections by identity.
///
/// `updated` contains only keys present in both whose values actually
/// differ; an unchanged value contributes nothing. Output keys are sorted
/// so callers and tests see a stable order.
pub fn diff_keyed<K, V>(old: &HashMap<K, V>, new: &HashMap<K, V>) -> KeyedDiff<K>
where
    K: Eq + Hash + Ord + Clone,
    V: PartialEq,
{
    let mut diff = KeyedDiff::default();

    for (key, value) in new {
        match old.get(key) {
            None => diff.added.push(key.clone()),
            Some(previous) if previous != value => diff.updated.push(key.clone()),
            Some(_) => {}
        }
    }

    for key in old.keys() {
        if !new.contains_key(key) {
            diff.removed.push(key.clone());
        }
    }

    diff.added.sort();
    diff.removed.sort();
    diff.updated.sort();
    diff
}
