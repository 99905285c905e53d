use scraper::{Html, Selector};
use serde_json::Value;

/// `headline` and `articleBody` from the page's JSON-LD metadata, if any.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JsonLdArticle {
    pub headline: Option<String>,
    pub body: Option<String>,
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Walks top-level objects, arrays and `@graph` lists.
fn collect(value: &Value, found: &mut JsonLdArticle) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect(item, found)),
        Value::Object(obj) => {
            if found.headline.is_none() {
                found.headline = non_empty(obj.get("headline"));
            }
            if found.body.is_none() {
                found.body = non_empty(obj.get("articleBody"));
            }
            if let Some(graph) = obj.get("@graph") {
                collect(graph, found);
            }
        }
        _ => {}
    }
}

pub fn extract_article(document: &Html) -> JsonLdArticle {
    let mut found = JsonLdArticle::default();

    if let Ok(script_selector) = Selector::parse("script[type='application/ld+json']") {
        for script in document.select(&script_selector) {
            let raw = script.text().collect::<String>();
            // Malformed blocks are common; skip them.
            if let Ok(json) = serde_json::from_str::<Value>(raw.trim()) {
                collect(&json, &mut found);
            }
            if found.headline.is_some() && found.body.is_some() {
                break;
            }
        }
    }

    found
}
