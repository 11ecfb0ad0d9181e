//! Snapshot diffing
//!
//! [`diff_snapshots`] classifies every key of a local and a remote snapshot
//! of one entity type. It does no I/O and never looks at record contents:
//! a key present on both sides is always an update candidate.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// Keys to apply locally, split by the write each one needs
///
/// The three sets are disjoint and together cover every key of both inputs.
/// Sets are ordered so the apply step runs in a stable key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff<K: Ord> {
    /// Present remotely, absent locally
    pub to_create: BTreeSet<K>,
    /// Present on both sides
    pub to_update: BTreeSet<K>,
    /// Present locally, absent remotely
    pub to_delete: BTreeSet<K>,
}

impl<K: Ord> Default for Diff<K> {
    fn default() -> Self {
        Self {
            to_create: BTreeSet::new(),
            to_update: BTreeSet::new(),
            to_delete: BTreeSet::new(),
        }
    }
}

impl<K: Ord> Diff<K> {
    /// Total number of keys across the three sets
    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classifies the keys of `local` and `remote` into create, update and delete
pub fn diff_snapshots<K, L, R>(local: &HashMap<K, L>, remote: &HashMap<K, R>) -> Diff<K>
where
    K: Hash + Eq + Ord + Clone,
{
    let mut diff = Diff::default();

    for key in remote.keys() {
        if local.contains_key(key) {
            diff.to_update.insert(key.clone());
        } else {
            diff.to_create.insert(key.clone());
        }
    }

    diff.to_delete.extend(
        local
            .keys()
            .filter(|key| !remote.contains_key(*key))
            .cloned(),
    );

    diff
}
