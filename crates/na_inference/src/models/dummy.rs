use std::fmt;

use na_core::{
    KeywordExtractor, Result, Sentiment, SentimentClassifier, SentimentLabel, SpeechSynthesizer,
    Summarizer, Translator,
};

/// Deterministic stand-in for every model capability.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SentimentClassifier for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn classify(&self, _text: &str) -> Result<Sentiment> {
        Ok(Sentiment::new(SentimentLabel::Neutral, 0.5))
    }
}

#[async_trait::async_trait]
impl Summarizer for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn summarize(&self, text: &str, max_len: usize) -> Result<String> {
        // First 20 words
        let words: Vec<&str> = text.split_whitespace().take(20).collect();
        Ok(words.join(" ").chars().take(max_len).collect())
    }
}

#[async_trait::async_trait]
impl KeywordExtractor for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn extract(&self, text: &str, top_n: usize) -> Result<Vec<(String, f64)>> {
        let mut seen = Vec::new();
        for word in text.split_whitespace() {
            let word = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if word.chars().count() > 3 && !seen.contains(&word) {
                seen.push(word);
            }
        }
        Ok(seen.into_iter().take(top_n).map(|w| (w, 1.0)).collect())
    }
}

#[async_trait::async_trait]
impl Translator for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        Ok(format!("[{}] {}", target_lang, text))
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }
}
