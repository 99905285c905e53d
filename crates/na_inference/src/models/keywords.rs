use std::collections::HashMap;
use std::fmt;

use na_core::{KeywordExtractor, Result};

use super::offload;
use super::text::{is_stop_word, phrase_chunks};

fn is_candidate(word: &str) -> bool {
    word.chars().count() > 2
        && !is_stop_word(word)
        && !word.chars().all(|c| c.is_numeric() || c == '\'')
}

#[derive(Default)]
struct Candidate {
    score: f64,
    first_seen: usize,
}

/// Ranks unigrams and repeated bigrams by frequency.
///
/// Relevance is normalized against the best candidate so the top keyword
/// is always `1.0`. Ties keep first-occurrence order.
pub fn rank_keywords(text: &str, top_n: usize) -> Vec<(String, f64)> {
    let mut candidates: HashMap<String, Candidate> = HashMap::new();
    let mut bigram_counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut position = 0;

    for chunk in phrase_chunks(text) {
        for (i, word) in chunk.iter().enumerate() {
            position += 1;
            if !is_candidate(word) {
                continue;
            }
            let entry = candidates.entry(word.clone()).or_insert(Candidate {
                score: 0.0,
                first_seen: position,
            });
            entry.score += 1.0;

            if let Some(next) = chunk.get(i + 1).filter(|next| is_candidate(next)) {
                let bigram = format!("{} {}", word, next);
                bigram_counts.entry(bigram).or_insert((0, position)).0 += 1;
            }
        }
    }

    for (bigram, (count, first_seen)) in bigram_counts {
        if count >= 2 {
            candidates.insert(
                bigram,
                Candidate {
                    score: count as f64 * 2.0,
                    first_seen,
                },
            );
        }
    }

    let mut ranked: Vec<(String, Candidate)> = candidates.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.score
            .total_cmp(&a.1.score)
            .then(a.1.first_seen.cmp(&b.1.first_seen))
            .then(a.0.cmp(&b.0))
    });
    ranked.truncate(top_n);

    let best = ranked.first().map(|(_, c)| c.score).unwrap_or(1.0);
    ranked
        .into_iter()
        .map(|(keyword, c)| (keyword, c.score / best))
        .collect()
}

#[derive(Default)]
pub struct NgramKeywordExtractor;

impl fmt::Debug for NgramKeywordExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NgramKeywordExtractor").finish()
    }
}

impl NgramKeywordExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl KeywordExtractor for NgramKeywordExtractor {
    fn name(&self) -> &str {
        "Ngram"
    }

    async fn extract(&self, text: &str, top_n: usize) -> Result<Vec<(String, f64)>> {
        let text = text.to_string();
        offload(move || rank_keywords(&text, top_n)).await
    }
}
