//! Traversal, rewrite, and restore over a parsed page
//!
//! [`Localizer`] owns the traversal policy (attribute allowlist, tag marker,
//! skip containers) and drives three passes that share one walk:
//!
//! - `snapshot_all` records originals into a [`SnapshotStore`] (absent-only)
//! - `rewrite` applies a catalog to the live values
//! - `restore_all` writes the recorded originals back
//!
//! Call order matters: a rewrite without a prior snapshot pass still works
//! visually but leaves restore with nothing to return to, so the controller
//! always snapshots before the first rewrite of a session.

use ego_tree::NodeId;
use scraper::node::Node;
use std::collections::HashSet;
use tracing::debug;

pub mod snapshot;

mod restore;
mod rewrite;

pub use snapshot::{SlotKey, SnapshotStore};

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::dom::Page;
use crate::models::{CoverageReport, RewriteReport, SourceString, UnitKind};
use crate::utils::is_blank;

/// One localizable unit found during traversal
#[derive(Debug, Clone)]
pub(crate) enum Unit {
    /// A visible text node and its raw value
    Text { node: NodeId, raw: String },
    /// An allowlisted attribute present on an element
    Attribute {
        node: NodeId,
        name: String,
        raw: String,
    },
    /// An element carrying a lookup-key marker, with its current text content
    Tagged {
        node: NodeId,
        key: String,
        content: String,
    },
}

/// The traversal and rewrite engine
pub struct Localizer {
    config: EngineConfig,
}

impl Localizer {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether a language is the base language (restore territory)
    pub fn is_base(&self, language: &crate::models::LanguageCode) -> bool {
        *language == self.config.base_language
    }

    /// Walk the tree and collect localizable units in document order
    ///
    /// Skip containers are never entered. A tagged element contributes its
    /// attribute units and one tagged unit, and its subtree is not descended
    /// into: the whole text content is handled as a single unit.
    pub(crate) fn collect_units(&self, page: &Page) -> Vec<Unit> {
        let tree = page.tree();
        let mut units = Vec::new();
        let mut stack = vec![tree.root().id()];

        while let Some(id) = stack.pop() {
            let Some(node) = tree.get(id) else { continue };
            let mut descend = true;

            match node.value() {
                Node::Element(element) => {
                    let name = element.name();
                    if self.config.skip_containers.iter().any(|skip| skip == name) {
                        continue;
                    }

                    for attr in &self.config.attribute_allowlist {
                        if let Some(value) = element.attr(attr) {
                            units.push(Unit::Attribute {
                                node: id,
                                name: attr.clone(),
                                raw: value.to_string(),
                            });
                        }
                    }

                    if let Some(key) = element.attr(&self.config.tag_attribute) {
                        if !is_blank(key) {
                            let content = page.text_content(id).unwrap_or_default();
                            units.push(Unit::Tagged {
                                node: id,
                                key: key.to_string(),
                                content,
                            });
                            descend = false;
                        }
                    }
                }
                Node::Text(text) => {
                    if !is_blank(&text.text) {
                        units.push(Unit::Text {
                            node: id,
                            raw: text.text.to_string(),
                        });
                    }
                    descend = false;
                }
                _ => {}
            }

            if descend {
                let children: Vec<_> = node.children().map(|child| child.id()).collect();
                for child in children.into_iter().rev() {
                    stack.push(child);
                }
            }
        }

        units
    }

    /// Record an original for every unit that has none yet
    ///
    /// Safe to call repeatedly; already-snapshotted slots are untouched.
    /// Returns how many records this pass created.
    pub fn snapshot_all(&self, page: &Page, store: &mut SnapshotStore) -> usize {
        let mut recorded = 0;

        for unit in self.collect_units(page) {
            let created = match unit {
                Unit::Text { node, raw } => store.record(SlotKey::Text(node), raw),
                Unit::Attribute { node, name, raw } => {
                    store.record(SlotKey::Attribute(node, name), raw)
                }
                Unit::Tagged { node, content, .. } => {
                    store.record(SlotKey::TextContent(node), content)
                }
            };
            if created {
                recorded += 1;
            }
        }

        debug!(recorded, total = store.len(), "Snapshot pass complete");
        recorded
    }

    /// Rewrite the tree against a catalog
    ///
    /// An empty catalog is a guaranteed no-op. Text units match on their
    /// snapshotted trimmed value with the snapshotted padding kept verbatim,
    /// attribute slots match on their raw original and are replaced
    /// outright, and tagged elements match on their lookup key and have
    /// their whole text content replaced.
    pub fn rewrite(
        &self,
        page: &mut Page,
        store: &SnapshotStore,
        catalog: &Catalog,
    ) -> RewriteReport {
        if catalog.is_empty() {
            debug!(language = %catalog.language(), "Catalog is empty; skipping rewrite");
            return RewriteReport::default();
        }

        let units = self.collect_units(page);
        let report = rewrite::rewrite_units(page, &units, store, catalog);
        debug!(
            language = %catalog.language(),
            texts = report.texts,
            attributes = report.attributes,
            tagged = report.tagged,
            misses = report.misses,
            "Rewrite pass complete"
        );
        report
    }

    /// Restore every recorded original, returning how many values changed
    pub fn restore_all(&self, page: &mut Page, store: &SnapshotStore) -> usize {
        let restored = restore::restore_all(page, store);
        debug!(restored, "Restore pass complete");
        restored
    }

    /// Snapshot then rewrite, the non-base half of the sync procedure
    pub fn apply(
        &self,
        page: &mut Page,
        store: &mut SnapshotStore,
        catalog: &Catalog,
    ) -> RewriteReport {
        self.snapshot_all(page, store);
        self.rewrite(page, store, catalog)
    }

    /// Distinct source strings present in the page, sorted by value
    pub fn source_strings(&self, page: &Page) -> Vec<SourceString> {
        let mut seen = HashSet::new();
        let mut sources = Vec::new();

        for unit in self.collect_units(page) {
            let source = match unit {
                Unit::Text { raw, .. } => SourceString {
                    kind: UnitKind::Text,
                    value: raw.trim().to_string(),
                },
                Unit::Attribute { raw, .. } => {
                    if raw.is_empty() {
                        continue;
                    }
                    SourceString {
                        kind: UnitKind::Attribute,
                        value: raw,
                    }
                }
                Unit::Tagged { key, .. } => SourceString {
                    kind: UnitKind::Tagged,
                    value: key,
                },
            };
            if seen.insert((source.kind, source.value.clone())) {
                sources.push(source);
            }
        }

        sources.sort_by(|a, b| a.value.cmp(&b.value));
        sources
    }

    /// How much of the page the catalog covers
    pub fn coverage(&self, page: &Page, catalog: &Catalog) -> CoverageReport {
        let sources = self.source_strings(page);
        let total = sources.len();

        let mut translated = 0;
        let mut missing = Vec::new();
        for source in sources {
            if catalog.get(&source.value).is_some() {
                translated += 1;
            } else {
                missing.push(source.value);
            }
        }
        missing.sort();
        missing.dedup();

        CoverageReport {
            language: catalog.language().clone(),
            total,
            translated,
            missing,
        }
    }
}
