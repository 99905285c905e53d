use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use na_core::{
    Error, KeywordExtractor, Result, SentimentClassifier, SpeechSynthesizer, Summarizer, Translator,
};
use tracing::info;

use crate::InferenceConfig;

pub mod dummy;
pub mod extractive;
pub mod google;
pub mod keywords;
pub mod lexicon;
pub mod remote;
pub mod text;

pub use dummy::DummyModel;
pub use extractive::ExtractiveSummarizer;
pub use google::GoogleTranslator;
pub use keywords::NgramKeywordExtractor;
pub use lexicon::LexiconSentimentModel;
pub use remote::RemoteModel;

pub const AVAILABLE_MODELS: &[&str] = &["builtin", "remote", "dummy"];

/// One handle per model capability, built once and shared by every run.
#[derive(Clone)]
pub struct ModelRegistry {
    pub sentiment: Arc<dyn SentimentClassifier>,
    pub summarizer: Arc<dyn Summarizer>,
    pub keywords: Arc<dyn KeywordExtractor>,
    pub translator: Arc<dyn Translator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.names()).finish()
    }
}

impl ModelRegistry {
    /// Capability name to backing model name, as reported by `/health`.
    pub fn names(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("sentiment", self.sentiment.name().to_string()),
            ("summarizer", self.summarizer.name().to_string()),
            ("keywords", self.keywords.name().to_string()),
            ("translator", self.translator.name().to_string()),
            ("speech", self.speech.name().to_string()),
        ])
    }

    pub fn dummy() -> Self {
        let model = Arc::new(DummyModel::new());
        Self {
            sentiment: model.clone(),
            summarizer: model.clone(),
            keywords: model.clone(),
            translator: model.clone(),
            speech: model,
        }
    }
}

pub fn create_models(config: &InferenceConfig) -> Result<ModelRegistry> {
    let registry = match config.model.as_str() {
        "builtin" => {
            let remote = Arc::new(RemoteModel::new(
                config.model_url.clone(),
                config.api_key.clone(),
                config.timeout,
            )?);
            ModelRegistry {
                sentiment: Arc::new(LexiconSentimentModel::new()),
                summarizer: Arc::new(ExtractiveSummarizer::new()),
                keywords: Arc::new(NgramKeywordExtractor::new()),
                translator: Arc::new(GoogleTranslator::new(config.translate_url.clone(), config.timeout)?),
                speech: remote,
            }
        }
        "remote" => {
            let remote = Arc::new(RemoteModel::new(
                config.model_url.clone(),
                config.api_key.clone(),
                config.timeout,
            )?);
            ModelRegistry {
                sentiment: remote.clone(),
                summarizer: remote.clone(),
                keywords: Arc::new(NgramKeywordExtractor::new()),
                translator: Arc::new(GoogleTranslator::new(config.translate_url.clone(), config.timeout)?),
                speech: remote,
            }
        }
        "dummy" => ModelRegistry::dummy(),
        other => {
            return Err(Error::Inference(format!(
                "Unsupported model: {}. Available models: {}",
                other,
                AVAILABLE_MODELS.join(", ")
            )))
        }
    };
    info!("🧠 Models loaded: {:?}", registry);
    Ok(registry)
}

/// Runs CPU-bound model work on the blocking pool.
pub(crate) async fn offload<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Inference(format!("model task failed: {}", e)))
}
