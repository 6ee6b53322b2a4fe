//! Localize a server-rendered page in place, then restore it
//!
//! Runs entirely in memory: a static catalog source and an in-memory
//! language store stand in for the catalog CDN and the persisted signal.

use std::sync::Arc;

use anuvad::catalog::{CatalogLoader, CatalogSource, StaticSource};
use anuvad::config::Config;
use anuvad::dom::Page;
use anuvad::engine::Localizer;
use anuvad::models::LanguageCode;
use anuvad::signal::{LanguageStore, MemoryStore};
use anuvad::sync::{Notification, SyncController, SyncEvent};
use anyhow::Result;
use serde_json::json;
use tokio::sync::broadcast;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Citizen Services</title></head>
<body>
    <h1>Welcome</h1>
    <p>Choose a service to begin.</p>
    <input type="search" placeholder="Search services">
    <button data-i18n="action.signin">Sign in</button>
</body>
</html>"#;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== In-Place Page Localization ===\n");

    let page = Page::parse(PAGE);
    let original = page.html();

    let hindi = LanguageCode::parse("hi")?;
    let english = LanguageCode::parse("en")?;

    let source: Arc<dyn CatalogSource> = Arc::new(StaticSource::new().with(
        hindi.clone(),
        json!({
            "Citizen Services": "नागरिक सेवाएं",
            "Welcome": "स्वागत है",
            "Choose a service to begin.": "शुरू करने के लिए एक सेवा चुनें।",
            "Search services": "सेवाएं खोजें",
            "action.signin": "साइन इन करें",
            "Back to home": "मुखपृष्ठ पर वापस"
        }),
    ));

    let config = Config::default();
    let settle = config.route_settle();
    let store: Arc<dyn LanguageStore> = Arc::new(MemoryStore::new());
    let (mut controller, _handle) = SyncController::new(
        page,
        Localizer::new(config.engine),
        CatalogLoader::new(source),
        store,
        settle,
    );
    let mut events = controller.subscribe();

    controller.mount().await;
    println!("Mounted in the base language:\n{}", controller.page().html());
    drain_events(&mut events);

    controller
        .process(Notification::LanguageChanged(hindi.clone()))
        .await;
    println!("\nAfter switching to Hindi:\n{}", controller.page().html());
    drain_events(&mut events);

    controller
        .process(Notification::LanguageChanged(english))
        .await;
    let restored = controller.page().html();
    println!("\nBack in the base language:\n{restored}");
    drain_events(&mut events);
    println!("\nByte-identical to the original: {}", restored == original);

    // A navigation mounts fresh content; the route trigger re-walks the
    // tree so the new nodes pick up the current language too
    controller.process(Notification::LanguageChanged(hindi)).await;
    drain_events(&mut events);
    let body = find_body(controller.page())?;
    if !controller
        .page_mut()
        .append_fragment(body, r#"<p><a href="/">Back to home</a></p>"#)
    {
        eprintln!("Could not mount the new fragment");
    }
    controller.process(Notification::RouteChanged).await;
    println!(
        "\nAfter a route change mounted a link:\n{}",
        controller.page().html()
    );
    drain_events(&mut events);

    println!("\n{}", controller.status().display());

    Ok(())
}

fn drain_events(events: &mut broadcast::Receiver<SyncEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            SyncEvent::Applied { language, report } => println!(
                "  -> applied {} ({} replacements, {} misses)",
                language,
                report.total(),
                report.misses
            ),
            SyncEvent::Restored { restored } => {
                println!("  -> restored {restored} originals")
            }
            SyncEvent::CatalogEmpty { language } => {
                println!("  -> no catalog entries for {language}")
            }
        }
    }
}

fn find_body(page: &Page) -> Result<ego_tree::NodeId> {
    page.tree()
        .root()
        .descendants()
        .find(|node| {
            node.value()
                .as_element()
                .map_or(false, |el| el.name() == "body")
        })
        .map(|node| node.id())
        .ok_or_else(|| anyhow::anyhow!("page has no <body>"))
}
