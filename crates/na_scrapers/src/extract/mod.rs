use std::fmt;
use std::sync::Arc;

use na_core::{AnalyzerConfig, ContentExtractionEngine, ExtractedContent, PageFetcher};
use tracing::{debug, warn};

pub mod jsonld;
pub mod readability;

pub use readability::ReadabilityExtractor;

/// Common utilities for extraction engines
pub(crate) mod utils {
    use na_core::{Error, Result};
    use scraper::{Html, Selector};

    pub fn selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|e| Error::Extraction(format!("Invalid selector {}: {}", selector, e)))
    }

    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Collapsed text of the first matching element, if it is not blank.
    pub fn first_text(document: &Html, css: &str) -> Result<Option<String>> {
        let selector = selector(css)?;
        Ok(document
            .select(&selector)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .find(|text| !text.is_empty()))
    }

    pub fn meta_content(document: &Html, css: &str) -> Result<Option<String>> {
        let selector = selector(css)?;
        Ok(document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(collapse_whitespace)
            .find(|text| !text.is_empty()))
    }
}

/// Downloads a page and runs the extraction engine over it.
#[derive(Clone)]
pub struct ContentExtractor {
    fetcher: Arc<dyn PageFetcher>,
    engine: Arc<dyn ContentExtractionEngine>,
    config: AnalyzerConfig,
}

impl fmt::Debug for ContentExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentExtractor")
            .field("fetcher", &self.fetcher)
            .field("engine", &self.engine)
            .finish()
    }
}

impl ContentExtractor {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        engine: Arc<dyn ContentExtractionEngine>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            fetcher,
            engine,
            config,
        }
    }

    pub fn with_readability(fetcher: Arc<dyn PageFetcher>, config: AnalyzerConfig) -> Self {
        let engine = Arc::new(ReadabilityExtractor::new(config.min_paragraph_words));
        Self::new(fetcher, engine, config)
    }

    /// Never fails; problems are reported through `extraction_error`.
    pub async fn extract(&self, url: &str) -> ExtractedContent {
        let raw = match self.fetcher.get(url, self.config.fetch_timeout).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to download {}: {}", url, e);
                return ExtractedContent::failed(url, e.to_string());
            }
        };

        let engine = self.engine.clone();
        let parsed = tokio::task::spawn_blocking(move || engine.extract(&raw)).await;
        match parsed {
            Ok(Ok(article)) => {
                let content = ExtractedContent::extracted(url, article);
                debug!(
                    "Extracted {} chars from {} (title: {:?})",
                    content.body.chars().count(),
                    url,
                    content.title
                );
                content
            }
            Ok(Err(e)) => {
                warn!("Extraction failed for {}: {}", url, e);
                ExtractedContent::failed(url, e.to_string())
            }
            Err(e) => {
                warn!("Extraction task for {} died: {}", url, e);
                ExtractedContent::failed(url, format!("extraction task failed: {}", e))
            }
        }
    }
}
