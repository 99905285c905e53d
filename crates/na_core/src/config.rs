use std::time::Duration;

use serde::Deserialize;

/// Tunables for one company analysis run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Feed entries considered per company.
    pub max_results: usize,
    /// Candidate URLs handed to the article pipeline.
    pub max_articles: usize,
    /// Width of the per-URL worker pool.
    pub concurrency: usize,
    pub redirect_timeout: Duration,
    pub fetch_timeout: Duration,
    /// Bound on the news feed query.
    pub feed_timeout: Duration,
    pub summary_max_length: usize,
    pub summary_input_limit: usize,
    pub sentiment_input_limit: usize,
    pub topic_input_limit: usize,
    pub top_n_topics: usize,
    pub translate_input_limit: usize,
    pub narrate_input_limit: usize,
    pub target_language: String,
    pub cache_capacity: usize,
    /// Paragraphs with fewer words are treated as boilerplate.
    pub min_paragraph_words: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_results: 15,
            max_articles: 10,
            concurrency: 5,
            redirect_timeout: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(10),
            feed_timeout: Duration::from_secs(10),
            summary_max_length: 150,
            summary_input_limit: 1024,
            sentiment_input_limit: 1024,
            topic_input_limit: 2048,
            top_n_topics: 5,
            translate_input_limit: 1500,
            narrate_input_limit: 500,
            target_language: "hi".to_string(),
            cache_capacity: 64,
            min_paragraph_words: 5,
        }
    }
}

/// Returns at most `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
