use std::time::Duration;

pub mod analyzer;
pub mod comparative;
pub mod localization;
pub mod models;

pub use analyzer::ArticleAnalyzer;
pub use comparative::aggregate;
pub use localization::Localizer;
pub use models::{create_models, ModelRegistry};

/// Which model backend to load and where its HTTP endpoints live.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// `builtin`, `remote` or `dummy`.
    pub model: String,
    pub model_url: Option<String>,
    pub translate_url: Option<String>,
    pub api_key: Option<String>,
    /// Upper bound on every hosted model and translator request.
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model: "builtin".to_string(),
            model_url: None,
            translate_url: None,
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

pub mod prelude {
    pub use super::analyzer::ArticleAnalyzer;
    pub use super::comparative::aggregate;
    pub use super::localization::{narration_text, Localizer};
    pub use super::models::{create_models, ModelRegistry};
    pub use super::InferenceConfig;
    pub use na_core::{Error, Result};
}
