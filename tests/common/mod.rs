//! Common test utilities

// Each integration test binary compiles this module and uses a subset
#![allow(dead_code)]

use anuvad::config::Config;
use anuvad::dom::Page;
use anuvad::engine::Localizer;
use anuvad::models::LanguageCode;
use ego_tree::NodeId;
use serde_json::{json, Value};

/// A server-rendered page exercising every localizable unit kind
pub const SAMPLE_PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>State Services Portal</title>
    <style>.nav { color: red; }</style>
</head>
<body>
    <nav>
        <a href="/" title="Go home">Home</a>
        <a href="/services">  Services  </a>
    </nav>
    <main>
        <h1>  Welcome to the portal  </h1>
        <p>Choose your state to continue.</p>
        <label data-i18n="form.state">Choose State</label>
        <select>
            <option>Select State</option>
        </select>
        <input type="search" placeholder="Search services" aria-label="Search services">
        <img src="/seal.png" alt="State seal">
        <script>var skipMe = "Do not translate";</script>
    </main>
</body>
</html>
"#;

/// A tagged element wrapping markup; rewrite and restore work on its text
/// content, so the inner markup flattens once a rewrite fires
pub const RICH_TAGGED_HTML: &str =
    r#"<html><body><div data-i18n="nav.home"><b>Home</b> page</div></body></html>"#;

/// Full Hindi catalog covering every unit in [`SAMPLE_PAGE_HTML`]
pub fn hindi_catalog() -> Value {
    json!({
        "State Services Portal": "राज्य सेवा पोर्टल",
        "Home": "मुखपृष्ठ",
        "Services": "सेवाएं",
        "Welcome to the portal": "पोर्टल में आपका स्वागत है",
        "Choose your state to continue.": "जारी रखने के लिए अपना राज्य चुनें।",
        "Select State": "राज्य चुनें",
        "form.state": "राज्य चुनें",
        "Go home": "घर जाएं",
        "Search services": "सेवाएं खोजें",
        "State seal": "राज्य मुहर",
        "nav.home": "मुखपृष्ठ"
    })
}

/// Partial French catalog; everything it misses stays as-is
pub fn french_catalog() -> Value {
    json!({
        "Home": "Accueil",
        "Welcome to the portal": "Bienvenue sur le portail"
    })
}

pub fn lang(code: &str) -> LanguageCode {
    LanguageCode::parse(code).unwrap()
}

/// A localizer with the default traversal policy
pub fn default_localizer() -> Localizer {
    Localizer::new(Config::default().engine)
}

/// Find the first element with the given tag name, optionally requiring an
/// attribute value
pub fn find_element(page: &Page, name: &str, attr: Option<(&str, &str)>) -> NodeId {
    page.tree()
        .root()
        .descendants()
        .find(|n| {
            n.value().as_element().is_some_and(|el| {
                el.name() == name && attr.map_or(true, |(k, v)| el.attr(k) == Some(v))
            })
        })
        .map(|n| n.id())
        .unwrap_or_else(|| panic!("no <{name}> element in page"))
}

/// First text node child of an element
pub fn first_text_child(page: &Page, element: NodeId) -> NodeId {
    page.tree()
        .get(element)
        .unwrap()
        .children()
        .find(|n| n.value().is_text())
        .map(|n| n.id())
        .expect("element has no text child")
}
