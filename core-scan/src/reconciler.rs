//! Path-keyed set reconciliation
//!
//! Computes the inserts and deletes that bring a persisted set in line with a
//! freshly scanned one. Items are identified by path; an item present on both
//! sides keeps its persisted identity.

use core_library::{Asset, Attachment};
use std::collections::{HashMap, HashSet};

/// An entity that can be diffed by path
pub trait Reconcilable {
    /// Identity key used for the diff
    fn key(&self) -> &str;

    /// Copy the persisted identity onto a freshly built item with the same key
    fn adopt_identity(&mut self, persisted: &Self);
}

impl Reconcilable for Asset {
    fn key(&self) -> &str {
        &self.path
    }

    fn adopt_identity(&mut self, persisted: &Self) {
        self.id = persisted.id.clone();
        self.created_at = persisted.created_at;
    }
}

impl Reconcilable for Attachment {
    fn key(&self) -> &str {
        &self.path
    }

    fn adopt_identity(&mut self, persisted: &Self) {
        self.id = persisted.id.clone();
        self.created_at = persisted.created_at;
    }
}

/// Result of [`reconcile`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff<T> {
    /// Fresh items with no persisted counterpart
    pub to_insert: Vec<T>,
    /// Persisted items with no fresh counterpart
    pub to_delete: Vec<T>,
    /// Fresh items that already exist, carrying their persisted identity
    pub unchanged: Vec<T>,
}

impl<T> Diff<T> {
    /// Whether applying the diff would change nothing
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_delete.is_empty()
    }

    /// Every item that exists once the diff is applied
    pub fn retained(&self) -> impl Iterator<Item = &T> {
        self.unchanged.iter().chain(self.to_insert.iter())
    }
}

/// Diff `fresh` against `persisted`.
///
/// Insert and delete sets are disjoint by key, so they can be applied in any
/// order. Output preserves the input order of each side.
pub fn reconcile<T: Reconcilable>(persisted: Vec<T>, fresh: Vec<T>) -> Diff<T> {
    let fresh_keys: HashSet<&str> = fresh.iter().map(|f| f.key()).collect();

    let mut persisted_by_key: HashMap<String, T> = HashMap::with_capacity(persisted.len());
    let mut to_delete = Vec::new();
    for item in persisted {
        if fresh_keys.contains(item.key()) {
            persisted_by_key.insert(item.key().to_string(), item);
        } else {
            to_delete.push(item);
        }
    }

    let mut to_insert = Vec::new();
    let mut unchanged = Vec::new();
    for mut item in fresh {
        match persisted_by_key.get(item.key()) {
            Some(existing) => {
                item.adopt_identity(existing);
                unchanged.push(item);
            }
            None => to_insert.push(item),
        }
    }

    Diff {
        to_insert,
        to_delete,
        unchanged,
    }
}
