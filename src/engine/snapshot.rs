//! Snapshot side table
//!
//! The host environment this engine models lets metadata ride directly on
//! live tree nodes. Here originals live out of band instead, keyed by node id
//! and slot, so the tree itself carries no localization state.

use ego_tree::NodeId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Identifies one localizable slot in the tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlotKey {
    /// The raw value of a text node
    Text(NodeId),
    /// A named attribute on an element
    Attribute(NodeId, String),
    /// The whole text content of a translation-tagged element
    TextContent(NodeId),
}

/// Side table of original values recorded before the first rewrite
///
/// First write wins: recording a slot that already holds a snapshot is a
/// no-op. That is what keeps restore anchored to the true original no matter
/// how many rewrite passes ran in between.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    originals: HashMap<SlotKey, String>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the original value for a slot unless one is already present
    ///
    /// Returns `true` if this call created the record.
    pub fn record(&mut self, key: SlotKey, original: impl Into<String>) -> bool {
        match self.originals.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(original.into());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// The recorded original for a slot, if any
    pub fn original(&self, key: &SlotKey) -> Option<&str> {
        self.originals.get(key).map(String::as_str)
    }

    /// Whether a slot has been snapshotted
    pub fn contains(&self, key: &SlotKey) -> bool {
        self.originals.contains_key(key)
    }

    /// Number of recorded slots
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Iterate over every recorded slot and its original value
    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &str)> {
        self.originals.iter().map(|(k, v)| (k, v.as_str()))
    }
}
