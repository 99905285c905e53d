use std::fmt;

use na_core::{ContentExtractionEngine, RawArticle, Result};
use scraper::{ElementRef, Html};

use super::jsonld;
use super::utils::{collapse_whitespace, first_text, meta_content, selector};

/// Paragraphs inside these elements are page chrome, not article text.
const BOILERPLATE: &[&str] = &["nav", "header", "footer", "aside", "form"];

/// Heuristic article extraction from raw HTML.
pub struct ReadabilityExtractor {
    min_paragraph_words: usize,
}

impl fmt::Debug for ReadabilityExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadabilityExtractor")
            .field("min_paragraph_words", &self.min_paragraph_words)
            .finish()
    }
}

impl ReadabilityExtractor {
    pub fn new(min_paragraph_words: usize) -> Self {
        Self {
            min_paragraph_words,
        }
    }

    fn title(&self, document: &Html, headline: Option<String>) -> Result<String> {
        if let Some(headline) = headline {
            return Ok(collapse_whitespace(&headline));
        }
        if let Some(og) = meta_content(document, "meta[property='og:title']")? {
            return Ok(og);
        }
        if let Some(title) = first_text(document, "title")? {
            return Ok(title);
        }
        Ok(first_text(document, "h1")?.unwrap_or_default())
    }

    /// Only chrome between the paragraph and its `scope` element counts. A
    /// `<form>` wrapping the whole page body is layout, not chrome.
    fn in_boilerplate(element: &ElementRef, scope: &str) -> bool {
        for node in element.ancestors() {
            let Some(el) = node.value().as_element() else {
                continue;
            };
            if el.name() == scope {
                return false;
            }
            let wraps_page = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|p| p.name() == "body"))
                .unwrap_or(false);
            if el.name() == "form" && wraps_page {
                continue;
            }
            if BOILERPLATE.contains(&el.name()) {
                return true;
            }
        }
        false
    }

    fn paragraphs(&self, document: &Html, scope: &str) -> Result<Vec<String>> {
        let paragraph_selector = selector(&format!("{} p", scope))?;
        let mut paragraphs: Vec<String> = Vec::new();
        for element in document.select(&paragraph_selector) {
            if Self::in_boilerplate(&element, scope) {
                continue;
            }
            let text = collapse_whitespace(&element.text().collect::<String>());
            if text.split_whitespace().count() < self.min_paragraph_words {
                continue;
            }
            // Nested containers can match the same paragraph twice.
            if paragraphs.last() != Some(&text) {
                paragraphs.push(text);
            }
        }
        Ok(paragraphs)
    }

    fn body(&self, document: &Html, article_body: Option<String>) -> Result<String> {
        if let Some(body) = article_body {
            return Ok(body);
        }
        for scope in ["article", "main", "body"] {
            let paragraphs = self.paragraphs(document, scope)?;
            if !paragraphs.is_empty() {
                return Ok(paragraphs.join("\n\n"));
            }
        }
        Ok(String::new())
    }
}

impl ContentExtractionEngine for ReadabilityExtractor {
    fn extract(&self, raw: &[u8]) -> Result<RawArticle> {
        let html = String::from_utf8_lossy(raw);
        let document = Html::parse_document(&html);
        let metadata = jsonld::extract_article(&document);

        Ok(RawArticle {
            title: self.title(&document, metadata.headline)?,
            body: self.body(&document, metadata.body)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> RawArticle {
        ReadabilityExtractor::new(5).extract(html.as_bytes()).unwrap()
    }

    #[test]
    fn test_prefers_article_paragraphs() {
        let article = extract(
            r#"<html><head><title>Site | Tesla   news</title></head><body>
                <header><p>Subscribe to our newsletter for daily updates now</p></header>
                <nav><p>Home World Business Markets Tech Opinion</p></nav>
                <article>
                  <h1>Tesla deliveries</h1>
                  <p>Tesla delivered more cars than analysts expected this quarter.</p>
                  <p>Share this</p>
                  <aside><p>Related: five other stories you might enjoy reading</p></aside>
                  <p>The company said demand for the Model Y remained strong.</p>
                </article>
                <footer><p>Copyright 2024 Example Media Group all rights reserved</p></footer>
            </body></html>"#,
        );
        assert_eq!(article.title, "Site | Tesla news");
        assert_eq!(
            article.body,
            "Tesla delivered more cars than analysts expected this quarter.\n\n\
             The company said demand for the Model Y remained strong."
        );
    }

    #[test]
    fn test_title_fallbacks() {
        let og = extract(
            r#"<html><head><meta property="og:title" content=" OG  headline "><title>Doc</title></head></html>"#,
        );
        assert_eq!(og.title, "OG headline");

        let h1 = extract("<html><body><h1>Only heading</h1></body></html>");
        assert_eq!(h1.title, "Only heading");

        let none = extract("<html><body></body></html>");
        assert_eq!(none.title, "");
        assert_eq!(none.body, "");
    }

    #[test]
    fn test_jsonld_wins() {
        let article = extract(
            r#"<html><head><title>Doc</title>
               <script type="application/ld+json">{"headline": "LD headline", "articleBody": "LD body text."}</script>
               </head><body><article><p>Visible paragraph with plenty of words here.</p></article></body></html>"#,
        );
        assert_eq!(article.title, "LD headline");
        assert_eq!(article.body, "LD body text.");
    }

    #[test]
    fn test_falls_back_to_main_then_all_paragraphs() {
        let main = extract(
            "<html><body><main><p>Main paragraph has enough words to count.</p></main>\
             <p>Loose paragraph also has enough words to count.</p></body></html>",
        );
        assert_eq!(main.body, "Main paragraph has enough words to count.");

        let loose = extract("<html><body><div><p>Loose paragraph also has enough words.</p></div></body></html>");
        assert_eq!(loose.body, "Loose paragraph also has enough words.");
    }

    #[test]
    fn test_page_wide_form_is_not_chrome() {
        let wrapped = extract(
            r#"<html><body><form id="aspnetForm"><article>
               <p>Tesla delivered more cars than analysts expected this quarter.</p>
               </article></form></body></html>"#,
        );
        assert_eq!(wrapped.body, "Tesla delivered more cars than analysts expected this quarter.");

        let bare = extract(
            r#"<html><body><form id="aspnetForm"><div>
               <p>Tesla delivered more cars than analysts expected this quarter.</p>
               <aside><p>Sign up for our newsletter with your email address</p></aside>
               </div></form></body></html>"#,
        );
        assert_eq!(bare.body, "Tesla delivered more cars than analysts expected this quarter.");
    }
}
