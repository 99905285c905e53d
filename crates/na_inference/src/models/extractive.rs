use std::collections::HashMap;
use std::fmt;

use na_core::{Result, Summarizer};

use super::offload;
use super::text::{is_stop_word, split_sentences, tokenize};

/// Bonus applied to the lead sentence; news copy front-loads the facts.
const LEAD_BONUS: f64 = 1.25;

/// Picks the highest scoring sentences (content-word frequency) that fit in
/// `max_len` characters and returns them in their original order.
pub fn summarize_text(text: &str, max_len: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() || max_len == 0 {
        return String::new();
    }

    let mut frequencies: HashMap<String, f64> = HashMap::new();
    for token in tokenize(text) {
        if token.chars().count() > 2 && !is_stop_word(&token) {
            *frequencies.entry(token).or_insert(0.0) += 1.0;
        }
    }
    let peak = frequencies.values().cloned().fold(1.0, f64::max);

    let mut scored: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(i, sentence)| {
            let tokens = tokenize(sentence);
            let weight: f64 = tokens
                .iter()
                .filter_map(|t| frequencies.get(t))
                .map(|f| f / peak)
                .sum();
            let mut score = weight / (tokens.len().max(1) as f64).sqrt();
            if i == 0 {
                score *= LEAD_BONUS;
            }
            (i, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut picked = Vec::new();
    let mut used = 0;
    for (i, _) in scored {
        let len = sentences[i].chars().count();
        let needed = if picked.is_empty() { len } else { len + 1 };
        if used + needed <= max_len {
            picked.push(i);
            used += needed;
        }
    }

    if picked.is_empty() {
        // Every sentence is longer than the budget; cut the lead one.
        return sentences[0].chars().take(max_len).collect();
    }

    picked.sort_unstable();
    picked
        .into_iter()
        .map(|i| sentences[i].as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Default)]
pub struct ExtractiveSummarizer;

impl fmt::Debug for ExtractiveSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractiveSummarizer").finish()
    }
}

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Summarizer for ExtractiveSummarizer {
    fn name(&self) -> &str {
        "Extractive"
    }

    async fn summarize(&self, text: &str, max_len: usize) -> Result<String> {
        let text = text.to_string();
        offload(move || summarize_text(&text, max_len)).await
    }
}
