//! Restore pass: write recorded originals back over the live tree

use tracing::trace;

use crate::dom::Page;
use crate::engine::snapshot::{SlotKey, SnapshotStore};

/// Write every recorded original back into the tree
///
/// Total and order-independent: each slot is restored on its own, slots
/// without a snapshot were never mutated and are left alone, and slots whose
/// node has meanwhile vanished are skipped silently. Writes that would not
/// change the current value are skipped, which both makes the returned count
/// meaningful and keeps untouched tagged elements (and their child markup)
/// byte-identical.
///
/// Returns the number of slots whose value actually changed back.
pub(crate) fn restore_all(page: &mut Page, store: &SnapshotStore) -> usize {
    let mut restored = 0;

    for (slot, original) in store.iter() {
        let wrote = match slot {
            SlotKey::Text(node) => match page.text_value(*node) {
                Some(current) if current != original => page.set_text_value(*node, original),
                _ => false,
            },
            SlotKey::Attribute(node, name) => match page.attribute(*node, name) {
                Some(current) if current != original => page.set_attribute(*node, name, original),
                _ => false,
            },
            SlotKey::TextContent(node) => match page.text_content(*node) {
                Some(current) if current != original => page.set_text_content(*node, original),
                _ => false,
            },
        };

        if wrote {
            trace!(?slot, "Restored original value");
            restored += 1;
        }
    }

    restored
}
