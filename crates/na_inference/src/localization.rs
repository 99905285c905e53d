use std::fmt;

use na_core::prelude::*;
use tracing::{debug, warn};

use crate::models::ModelRegistry;

/// Text spoken for a company's verdict before translation.
pub fn narration_text(company: &str, verdict: &str) -> String {
    format!("{} के बारे में समाचार विश्लेषण: {}", company, verdict)
}

/// Translation and speech synthesis with silent fallbacks.
#[derive(Clone)]
pub struct Localizer {
    models: ModelRegistry,
    config: AnalyzerConfig,
}

impl fmt::Debug for Localizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Localizer")
            .field("translator", &self.models.translator.name())
            .field("speech", &self.models.speech.name())
            .field("target_language", &self.config.target_language)
            .finish()
    }
}

impl Localizer {
    pub fn new(models: ModelRegistry, config: AnalyzerConfig) -> Self {
        Self { models, config }
    }

    pub fn target_language(&self) -> &str {
        &self.config.target_language
    }

    /// Falls back to the (truncated) input when translation fails.
    pub async fn translate(&self, text: &str, lang: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        let input = truncate_chars(text, self.config.translate_input_limit);
        match self.models.translator.translate(input, lang).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Translation to {} failed, keeping source text: {}", lang, e);
                input.to_string()
            }
        }
    }

    /// Audio bytes for `text`, or empty on failure.
    pub async fn narrate(&self, text: &str) -> Vec<u8> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let input = truncate_chars(text, self.config.narrate_input_limit);
        match self.models.speech.synthesize(input).await {
            Ok(audio) => {
                debug!("Synthesized {} bytes of audio", audio.len());
                audio
            }
            Err(e) => {
                warn!("Speech synthesis failed: {}", e);
                Vec::new()
            }
        }
    }

    /// The company's verdict as narration text in the target language.
    pub async fn localize_verdict(&self, company: &str, verdict: &str) -> String {
        let text = narration_text(company, verdict);
        self.translate(&text, self.target_language()).await
    }
}
