//! Cross-article comparison: sentiment distribution, topic overlap, pairwise
//! coverage differences and the overall verdict.

use std::collections::{BTreeMap, HashSet};

use na_core::{
    ArticleAnalysis, ComparativeResult, CoverageDifference, SentimentDistribution, SentimentLabel,
    TopicOverlap,
};

/// Ratio a label must exceed to dominate the verdict.
const DOMINANCE_THRESHOLD: f64 = 0.6;
/// Pairs are drawn from `i < 3`, `j < 4`.
const FIRST_WINDOW: usize = 3;
const SECOND_WINDOW: usize = 4;

const COVERAGE_IMPACT: &str = "This shows varying perspectives in the news coverage about the company.";

pub fn sentiment_distribution(articles: &[ArticleAnalysis]) -> SentimentDistribution {
    let mut distribution = SentimentDistribution::default();
    for article in articles {
        distribution.record(article.sentiment.label);
    }
    distribution
}

pub fn topic_overlap(articles: &[ArticleAnalysis]) -> TopicOverlap {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for article in articles {
        let mut seen = HashSet::new();
        for topic in &article.topics {
            if !seen.insert(topic.as_str()) {
                continue;
            }
            let count = counts.entry(topic.clone()).or_insert(0);
            if *count == 0 {
                order.push(topic);
            }
            *count += 1;
        }
    }

    let common_topics = order
        .into_iter()
        .filter(|topic| counts.get(*topic).copied().unwrap_or(0) > 1)
        .map(str::to_string)
        .collect();

    TopicOverlap {
        common_topics,
        topic_distribution: counts,
    }
}

pub fn coverage_differences(articles: &[ArticleAnalysis]) -> Vec<CoverageDifference> {
    let mut differences = Vec::new();
    for i in 0..articles.len().min(FIRST_WINDOW) {
        for j in (i + 1)..articles.len().min(SECOND_WINDOW) {
            let left = articles[i].sentiment.label;
            let right = articles[j].sentiment.label;
            if left == right {
                continue;
            }
            differences.push(CoverageDifference {
                comparison: format!(
                    "Article {} has a {} sentiment, while Article {} has a {} sentiment.",
                    i + 1,
                    left.as_str().to_lowercase(),
                    j + 1,
                    right.as_str().to_lowercase()
                ),
                impact: COVERAGE_IMPACT.to_string(),
            });
        }
    }
    differences
}

pub fn final_verdict(distribution: &SentimentDistribution) -> String {
    let (category, expectation) =
        if distribution.ratio(SentimentLabel::Positive) > DOMINANCE_THRESHOLD {
            ("mostly positive", "Potential positive impact expected.")
        } else if distribution.ratio(SentimentLabel::Negative) > DOMINANCE_THRESHOLD {
            ("mostly negative", "Potential challenges might be ahead.")
        } else {
            (
                "mixed",
                "The situation appears complex with both positive and negative aspects.",
            )
        };
    format!(
        "The company's latest news coverage is {}. {}",
        category, expectation
    )
}

pub fn aggregate(articles: &[ArticleAnalysis]) -> ComparativeResult {
    let sentiment_distribution = sentiment_distribution(articles);
    ComparativeResult {
        final_verdict: final_verdict(&sentiment_distribution),
        coverage_differences: coverage_differences(articles),
        topic_overlap: topic_overlap(articles),
        sentiment_distribution,
    }
}
