pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod types;

pub use config::AnalyzerConfig;
pub use error::{Error, Result};
pub use models::{
    ContentExtractionEngine, KeywordExtractor, NewsFeedClient, PageFetcher, SentimentClassifier,
    SpeechSynthesizer, Summarizer, Translator,
};
pub use storage::{AnalysisCache, TaskRegistry};
pub use types::{
    AnalysisTask, ArticleAnalysis, CompanyAnalysisError, CompanyAnalysisResult, CompanyReport,
    ComparativeResult, CoverageDifference, ExtractedContent, RawArticle, RunStage, Sentiment,
    SentimentDistribution, SentimentLabel, TopicOverlap,
};

pub mod prelude {
    pub use super::config::{truncate_chars, AnalyzerConfig};
    pub use super::types::*;
    pub use super::{Error, Result};
}
