pub mod cli;
pub mod company;
pub mod extract;
pub mod feed;
pub mod http;
pub mod logging;
pub mod manager;
pub mod service;

pub use cli::{handle_command, ScraperCommands};
pub use company::NewsAnalyzer;
pub use extract::{ContentExtractor, ReadabilityExtractor};
pub use feed::{GoogleNewsClient, SourceResolver};
pub use http::HttpFetcher;
pub use logging::{init_logging, Logger};
pub use manager::ArticlePipeline;
pub use service::{AnalysisService, StartOutcome};

pub mod prelude {
    pub use super::company::NewsAnalyzer;
    pub use super::service::{AnalysisService, StartOutcome};
    pub use na_core::{CompanyReport, Error, Result};
}
