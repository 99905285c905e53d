use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::types::{RawArticle, Sentiment};
use crate::Result;

#[async_trait]
pub trait NewsFeedClient: Send + Sync + fmt::Debug {
    /// Returns up to `limit` entry links for a free-text query, in feed order.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>>;
}

#[async_trait]
pub trait PageFetcher: Send + Sync + fmt::Debug {
    /// Downloads a page body. Non-success statuses are errors.
    async fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>>;

    /// Follows redirects from `url` and returns the final destination.
    async fn resolve(&self, url: &str, timeout: Duration) -> Result<String>;
}

pub trait ContentExtractionEngine: Send + Sync + fmt::Debug {
    fn extract(&self, raw: &[u8]) -> Result<RawArticle>;
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn classify(&self, text: &str) -> Result<Sentiment>;
}

#[async_trait]
pub trait Summarizer: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn summarize(&self, text: &str, max_len: usize) -> Result<String>;
}

#[async_trait]
pub trait KeywordExtractor: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Ranked `(phrase, relevance)` pairs, most relevant first.
    async fn extract(&self, text: &str, top_n: usize) -> Result<Vec<(String, f64)>>;
}

#[async_trait]
pub trait Translator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn translate(&self, text: &str, target_lang: &str) -> Result<String>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
