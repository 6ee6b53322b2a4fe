//! Rewrite pass: apply catalog lookups to collected units in place

use tracing::trace;

use crate::catalog::Catalog;
use crate::dom::Page;
use crate::engine::snapshot::{SlotKey, SnapshotStore};
use crate::engine::Unit;
use crate::models::RewriteReport;
use crate::utils::split_padding;

/// Rewrite every unit whose lookup key has a catalog entry
///
/// Lookups always go through the recorded original, not the currently
/// displayed value, so repeated passes re-match instead of chaining
/// translations. Writes that would not change the current value are skipped;
/// the report counts actual mutations.
pub(crate) fn rewrite_units(
    page: &mut Page,
    units: &[Unit],
    store: &SnapshotStore,
    catalog: &Catalog,
) -> RewriteReport {
    let mut report = RewriteReport::default();

    for unit in units {
        match unit {
            Unit::Text { node, raw } => {
                let original = store.original(&SlotKey::Text(*node)).unwrap_or(raw);
                let (lead, key, trail) = split_padding(original);
                if key.is_empty() {
                    continue;
                }

                let Some(translated) = catalog.get(key) else {
                    report.misses += 1;
                    continue;
                };

                // Interior replacement: the original padding stays verbatim.
                // Padding must come from the original, not the current value,
                // or a translation carrying its own padding would be absorbed
                // and re-padded on every pass.
                let next = format!("{lead}{translated}{trail}");
                if next != *raw && page.set_text_value(*node, &next) {
                    trace!(key, "Rewrote text unit");
                    report.texts += 1;
                }
            }

            Unit::Attribute { node, name, raw } => {
                // Only attributes present with a non-empty value participate
                if raw.is_empty() {
                    continue;
                }

                let slot = SlotKey::Attribute(*node, name.clone());
                let key = store.original(&slot).unwrap_or(raw);

                let Some(translated) = catalog.get(key) else {
                    report.misses += 1;
                    continue;
                };

                if translated != raw && page.set_attribute(*node, name, translated) {
                    trace!(key, attribute = %name, "Rewrote attribute slot");
                    report.attributes += 1;
                }
            }

            Unit::Tagged { node, key, content } => {
                let Some(translated) = catalog.get(key) else {
                    report.misses += 1;
                    continue;
                };

                // Writing equal content would still flatten element children
                if translated != content && page.set_text_content(*node, translated) {
                    trace!(key, "Rewrote tagged element");
                    report.tagged += 1;
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::Localizer;
    use crate::models::LanguageCode;
    use serde_json::json;

    fn catalog(entries: serde_json::Value) -> Catalog {
        Catalog::from_value(LanguageCode::parse("hi").unwrap(), entries).unwrap()
    }

    fn localizer() -> Localizer {
        Localizer::new(EngineConfig {
            base_language: LanguageCode::english(),
            attribute_allowlist: vec!["placeholder".into(), "title".into()],
            tag_attribute: "data-i18n".into(),
            skip_containers: vec!["script".into(), "style".into()],
        })
    }

    #[test]
    fn test_whitespace_is_preserved() {
        let mut page = Page::parse("<p>  Hello  </p>");
        let localizer = localizer();
        let mut store = SnapshotStore::new();

        localizer.snapshot_all(&page, &mut store);
        let report = localizer.rewrite(&mut page, &store, &catalog(json!({"Hello": "Bonjour"})));

        assert_eq!(report.texts, 1);
        assert!(page.html().contains("  Bonjour  "));
    }

    #[test]
    fn test_no_match_leaves_bytes_alone() {
        let mut page = Page::parse("<p>  Untranslated  </p>");
        let localizer = localizer();
        let mut store = SnapshotStore::new();
        localizer.snapshot_all(&page, &mut store);

        let before = page.html();
        let report = localizer.rewrite(&mut page, &store, &catalog(json!({"Hello": "Bonjour"})));

        assert_eq!(report.total(), 0);
        assert_eq!(report.misses, 1);
        assert_eq!(page.html(), before);
    }

    #[test]
    fn test_empty_catalog_is_a_no_op() {
        let mut page = Page::parse("<p>Hello</p><input placeholder=\"Hello\">");
        let localizer = localizer();
        let mut store = SnapshotStore::new();
        localizer.snapshot_all(&page, &mut store);

        let before = page.html();
        let report = localizer.rewrite(
            &mut page,
            &store,
            &Catalog::empty(LanguageCode::parse("hi").unwrap()),
        );

        assert_eq!(report.total(), 0);
        assert_eq!(page.html(), before);
    }

    #[test]
    fn test_attribute_allowlist_is_enforced() {
        let mut page = Page::parse(r#"<input placeholder="Hello" data-hint="Hello">"#);
        let localizer = localizer();
        let mut store = SnapshotStore::new();
        localizer.snapshot_all(&page, &mut store);

        localizer.rewrite(&mut page, &store, &catalog(json!({"Hello": "नमस्ते"})));

        let html = page.html();
        assert!(html.contains(r#"placeholder="नमस्ते""#));
        // Not allowlisted, value untouched even though it matches a key
        assert!(html.contains(r#"data-hint="Hello""#));
    }

    #[test]
    fn test_repeated_rewrite_rematches_original() {
        let mut page = Page::parse("<p>Hello</p>");
        let localizer = localizer();
        let mut store = SnapshotStore::new();
        localizer.snapshot_all(&page, &mut store);

        let hi = catalog(json!({"Hello": "नमस्ते"}));
        localizer.rewrite(&mut page, &store, &hi);
        assert!(page.html().contains("नमस्ते"));

        // Second pass against a different language still matches "Hello"
        let fr = Catalog::from_value(
            LanguageCode::parse("fr").unwrap(),
            json!({"Hello": "Bonjour"}),
        )
        .unwrap();
        let report = localizer.rewrite(&mut page, &store, &fr);

        assert_eq!(report.texts, 1);
        assert!(page.html().contains("Bonjour"));
        assert!(!page.html().contains("नमस्ते"));
    }

    #[test]
    fn test_padded_translation_does_not_compound() {
        let mut page = Page::parse("<p>  Hello  </p>");
        let localizer = localizer();
        let mut store = SnapshotStore::new();
        localizer.snapshot_all(&page, &mut store);

        // The translation carries padding of its own; it must not leak into
        // the node padding and accumulate across passes
        let hi = catalog(json!({"Hello": " Bonjour "}));
        let first = localizer.rewrite(&mut page, &store, &hi);
        let after_first = page.html();

        assert_eq!(first.texts, 1);
        assert!(after_first.contains("   Bonjour   "));

        let second = localizer.rewrite(&mut page, &store, &hi);
        assert_eq!(second.texts, 0);
        assert_eq!(page.html(), after_first);
    }

    #[test]
    fn test_rewrite_is_idempotent_per_catalog() {
        let mut page = Page::parse("<p>Hello</p>");
        let localizer = localizer();
        let mut store = SnapshotStore::new();
        localizer.snapshot_all(&page, &mut store);

        let hi = catalog(json!({"Hello": "नमस्ते"}));
        let first = localizer.rewrite(&mut page, &store, &hi);
        let after_first = page.html();
        let second = localizer.rewrite(&mut page, &store, &hi);

        assert_eq!(first.texts, 1);
        assert_eq!(second.total(), 0);
        assert_eq!(page.html(), after_first);
    }

    #[test]
    fn test_tagged_element_lookup_uses_marker_key() {
        let mut page = Page::parse(r#"<span data-i18n="state.select">Choose State</span>"#);
        let localizer = localizer();
        let mut store = SnapshotStore::new();
        localizer.snapshot_all(&page, &mut store);

        let report = localizer.rewrite(
            &mut page,
            &store,
            &catalog(json!({"state.select": "राज्य चुनें"})),
        );

        assert_eq!(report.tagged, 1);
        assert!(page.html().contains("राज्य चुनें"));
    }

    #[test]
    fn test_tagged_takes_precedence_over_inner_text() {
        let mut page = Page::parse(r#"<span data-i18n="greet">Hello</span>"#);
        let localizer = localizer();
        let mut store = SnapshotStore::new();
        localizer.snapshot_all(&page, &mut store);

        // "Hello" is a text-unit key, but the tagged lookup key is "greet";
        // the inner text must not be rewritten independently
        let report = localizer.rewrite(
            &mut page,
            &store,
            &catalog(json!({"Hello": "WRONG", "greet": "नमस्ते"})),
        );

        assert_eq!(report.tagged, 1);
        assert_eq!(report.texts, 0);
        assert!(page.html().contains("नमस्ते"));
        assert!(!page.html().contains("WRONG"));
    }
}
