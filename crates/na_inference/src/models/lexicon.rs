use std::collections::HashSet;
use std::fmt;

use lazy_static::lazy_static;
use na_core::{Result, Sentiment, SentimentClassifier, SentimentLabel};

use super::offload;
use super::text::tokenize;

/// Net polarity inside this band is reported as neutral.
const NEUTRAL_BAND: f64 = 0.15;
/// How many tokens back a negator still flips polarity.
const NEGATION_WINDOW: usize = 3;

lazy_static! {
    static ref POSITIVE: HashSet<&'static str> = [
        "advance", "ahead", "approval", "approve", "beat", "benefit", "best", "bonus", "boom",
        "boost", "breakthrough", "bullish", "celebrate", "confident", "gain", "good", "great",
        "grow", "growth", "high", "improve", "improvement", "innovative", "innovation", "jump",
        "launch", "lead", "leader", "milestone", "optimism", "optimistic", "outperform",
        "partnership", "positive", "praise", "profit", "profitable", "rally",
        "recover", "recovery", "rise", "rose", "soar", "solid", "strong", "stronger", "success",
        "successful", "surge", "surpass", "thrive", "top", "upbeat", "upgrade", "upside", "win", "won",
    ]
    .into_iter()
    .collect();

    static ref NEGATIVE: HashSet<&'static str> = [
        "accident", "bankrupt", "bankruptcy", "bearish", "challenge", "concern", "crash",
        "crisis", "cut", "damage", "decline", "default", "delay", "disappoint", "downgrade",
        "drop", "fail", "failure", "fall", "fell", "fraud", "investigation", "lawsuit",
        "layoff", "loss", "lose", "miss", "negative", "penalty", "plunge", "probe", "problem",
        "recall", "risk", "scandal", "shortage", "slump", "slowdown", "sue", "tumble",
        "uncertainty", "underperform", "warn", "warning", "weak", "weaker", "worry", "worse",
        "worst",
    ]
    .into_iter()
    .collect();

    static ref NEGATORS: HashSet<&'static str> = [
        "not", "no", "never", "neither", "nor", "without", "hardly", "don't", "doesn't",
        "didn't", "isn't", "wasn't", "aren't", "won't", "can't", "cannot",
    ]
    .into_iter()
    .collect();
}

fn polarity_of(word: &str) -> i32 {
    let variants = [
        Some(word),
        word.strip_suffix("ing"),
        word.strip_suffix("ed"),
        word.strip_suffix("es"),
        word.strip_suffix('s'),
        word.strip_suffix('d'),
    ];
    for candidate in variants.into_iter().flatten().filter(|c| !c.is_empty()) {
        if POSITIVE.contains(candidate) {
            return 1;
        }
        if NEGATIVE.contains(candidate) {
            return -1;
        }
    }
    // "worries" -> "worry"
    if let Some(stem) = word.strip_suffix("ies") {
        let singular = format!("{}y", stem);
        if POSITIVE.contains(singular.as_str()) {
            return 1;
        }
        if NEGATIVE.contains(singular.as_str()) {
            return -1;
        }
    }
    0
}

/// Scores text with a finance/news polarity lexicon and short-range negation.
pub fn score_text(text: &str) -> Sentiment {
    let tokens = tokenize(text);
    let mut positive = 0u32;
    let mut negative = 0u32;

    for (i, token) in tokens.iter().enumerate() {
        let mut polarity = polarity_of(token);
        if polarity == 0 {
            continue;
        }
        let window_start = i.saturating_sub(NEGATION_WINDOW);
        if tokens[window_start..i].iter().any(|t| NEGATORS.contains(t.as_str())) {
            polarity = -polarity;
        }
        if polarity > 0 {
            positive += 1;
        } else {
            negative += 1;
        }
    }

    let hits = f64::from(positive + negative);
    // Two pseudo-counts keep a single hit from reading as certainty.
    let polarity = (f64::from(positive) - f64::from(negative)) / (hits + 2.0);

    if polarity > NEUTRAL_BAND {
        Sentiment::new(SentimentLabel::Positive, 0.5 + polarity / 2.0)
    } else if polarity < -NEUTRAL_BAND {
        Sentiment::new(SentimentLabel::Negative, 0.5 + polarity.abs() / 2.0)
    } else {
        Sentiment::new(
            SentimentLabel::Neutral,
            0.5 + 0.5 * (1.0 - polarity.abs() / NEUTRAL_BAND),
        )
    }
}

#[derive(Default)]
pub struct LexiconSentimentModel;

impl fmt::Debug for LexiconSentimentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LexiconSentimentModel").finish()
    }
}

impl LexiconSentimentModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl SentimentClassifier for LexiconSentimentModel {
    fn name(&self) -> &str {
        "Lexicon"
    }

    async fn classify(&self, text: &str) -> Result<Sentiment> {
        let text = text.to_string();
        offload(move || score_text(&text)).await
    }
}
