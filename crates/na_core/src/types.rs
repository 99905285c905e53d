use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
        }
    }

    /// Maps a raw classifier label onto the three-class scheme.
    ///
    /// Accepts the positional ids emitted by 3-class sequence classifiers
    /// (`LABEL_0` = negative, `LABEL_1` = neutral, `LABEL_2` = positive) as well
    /// as the spelled-out names.
    pub fn from_model_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "LABEL_0" | "NEGATIVE" | "NEG" => Some(SentimentLabel::Negative),
            "LABEL_1" | "NEUTRAL" | "NEU" => Some(SentimentLabel::Neutral),
            "LABEL_2" | "POSITIVE" | "POS" => Some(SentimentLabel::Positive),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

impl Sentiment {
    /// Builds a sentiment with the score clamped into `[0, 1]`.
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        let score = if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.5 };
        Self { label, score }
    }
}

impl Default for Sentiment {
    fn default() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.5,
        }
    }
}

/// Title and body as produced by a content extraction engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArticle {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub title: String,
    pub body: String,
    pub source_url: String,
    pub extraction_error: Option<String>,
}

impl ExtractedContent {
    pub fn extracted(source_url: &str, raw: RawArticle) -> Self {
        let extraction_error = if raw.body.trim().is_empty() {
            Some("No content extracted".to_string())
        } else {
            None
        };
        Self {
            title: raw.title,
            body: raw.body,
            source_url: source_url.to_string(),
            extraction_error,
        }
    }

    pub fn failed(source_url: &str, reason: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            source_url: source_url.to_string(),
            extraction_error: Some(reason.into()),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.extraction_error.is_none() && !self.body.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleAnalysis {
    pub title: String,
    pub summary: String,
    pub sentiment: Sentiment,
    pub topics: Vec<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_error: Option<String>,
}

impl ArticleAnalysis {
    pub fn is_valid(&self) -> bool {
        self.analysis_error.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    #[serde(rename = "POSITIVE")]
    pub positive: usize,
    #[serde(rename = "NEGATIVE")]
    pub negative: usize,
    #[serde(rename = "NEUTRAL")]
    pub neutral: usize,
}

impl SentimentDistribution {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    pub fn count(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Share of `label` among all counted articles, `0.0` when nothing was counted.
    pub fn ratio(&self, label: SentimentLabel) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.count(label) as f64 / total as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageDifference {
    #[serde(rename = "Comparison")]
    pub comparison: String,
    #[serde(rename = "Impact")]
    pub impact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicOverlap {
    #[serde(rename = "Common Topics")]
    pub common_topics: Vec<String>,
    #[serde(rename = "Topic Distribution")]
    pub topic_distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparativeResult {
    #[serde(rename = "Sentiment Distribution")]
    pub sentiment_distribution: SentimentDistribution,
    #[serde(rename = "Coverage Differences")]
    pub coverage_differences: Vec<CoverageDifference>,
    #[serde(rename = "Topic Overlap")]
    pub topic_overlap: TopicOverlap,
    #[serde(rename = "Final Sentiment Analysis")]
    pub final_verdict: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyAnalysisResult {
    #[serde(rename = "Company")]
    pub company_name: String,
    #[serde(rename = "Articles")]
    pub articles: Vec<ArticleAnalysis>,
    #[serde(rename = "Comparative Sentiment Score")]
    pub comparative: ComparativeResult,
    #[serde(rename = "Final Sentiment Analysis")]
    pub final_verdict: String,
    #[serde(rename = "Hindi Text")]
    pub localized_verdict: String,
    #[serde(rename = "Audio", with = "audio_base64", default)]
    pub narration_audio: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyAnalysisError {
    #[serde(rename = "Company")]
    pub company_name: String,
    pub error: String,
}

/// Terminal artifact of one company run: a full result or a structured error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompanyReport {
    Completed(Box<CompanyAnalysisResult>),
    Failed(CompanyAnalysisError),
}

impl CompanyReport {
    pub fn failed(company_name: &str, error: impl ToString) -> Self {
        CompanyReport::Failed(CompanyAnalysisError {
            company_name: company_name.to_string(),
            error: error.to_string(),
        })
    }

    pub fn company_name(&self) -> &str {
        match self {
            CompanyReport::Completed(result) => &result.company_name,
            CompanyReport::Failed(failure) => &failure.company_name,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            CompanyReport::Completed(_) => None,
            CompanyReport::Failed(failure) => Some(&failure.error),
        }
    }

    pub fn result(&self) -> Option<&CompanyAnalysisResult> {
        match self {
            CompanyReport::Completed(result) => Some(result),
            CompanyReport::Failed(_) => None,
        }
    }
}

impl From<CompanyAnalysisResult> for CompanyReport {
    fn from(result: CompanyAnalysisResult) -> Self {
        CompanyReport::Completed(Box::new(result))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStage {
    Pending,
    Resolving,
    Extracting,
    Aggregating,
    Localizing,
    Narrating,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisTask {
    pub task_id: String,
    pub company: String,
    pub stage: RunStage,
    pub completed: bool,
    pub report: Option<CompanyReport>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AnalysisTask {
    pub fn new(task_id: &str, company: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            company: company.to_string(),
            stage: RunStage::Pending,
            completed: false,
            report: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Moves the run forward. Completed tasks never change stage again.
    pub fn advance(&mut self, stage: RunStage) {
        if !self.completed && stage > self.stage {
            self.stage = stage;
        }
    }

    /// Records the terminal report. Returns `false` if the task had already completed.
    pub fn complete(&mut self, report: CompanyReport) -> bool {
        if self.completed {
            return false;
        }
        self.stage = RunStage::Completed;
        self.completed = true;
        self.report = Some(report);
        self.completed_at = Some(Utc::now());
        true
    }
}

/// Deterministic polling id for a company run. Names sharing a cache key
/// share a task id.
pub fn task_id_for(company: &str) -> String {
    format!("task_{}", normalize_company(company).replace(' ', "_"))
}

/// Cache key for a company name: trimmed, inner whitespace collapsed, lower-cased.
pub fn normalize_company(company: &str) -> String {
    company
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

mod audio_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
