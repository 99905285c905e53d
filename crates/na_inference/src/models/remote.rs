use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use na_core::{Error, Result, Sentiment, SentimentClassifier, SentimentLabel, SpeechSynthesizer, Summarizer};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
pub const SENTIMENT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment";
pub const SUMMARY_MODEL: &str = "sshleifer/distilbart-cnn-12-6";
pub const SPEECH_MODEL: &str = "facebook/mms-tts-hin";

const MIN_SUMMARY_LENGTH: usize = 30;

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<SummaryParameters>,
}

#[derive(Serialize)]
struct SummaryParameters {
    max_length: usize,
    min_length: usize,
    length_penalty: f64,
    num_beams: u32,
    early_stopping: bool,
}

#[derive(Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

/// Hosted inference endpoint speaking the `{"inputs": ...}` protocol.
///
/// Each capability posts to `{base_url}/{model}`.
pub struct RemoteModel {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
}

impl fmt::Debug for RemoteModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteModel")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RemoteModel {
    pub fn new(base_url: Option<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_INFERENCE_URL.to_string());
        url::Url::parse(&base_url)?;
        Ok(Self {
            client: Arc::new(Client::builder().timeout(timeout).build()?),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn post(&self, model: &str, request: &InferenceRequest<'_>) -> Result<reqwest::Response> {
        let mut builder = self
            .client
            .post(format!("{}/{}", self.base_url, model))
            .json(request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Inference(format!("{} returned {}", model, status)));
        }
        Ok(response)
    }
}

/// Accepts both `[[{label, score}]]` and `[{label, score}]`.
fn parse_label_scores(value: Value) -> Result<Vec<LabelScore>> {
    let flattened = match value {
        Value::Array(outer) if matches!(outer.first(), Some(Value::Array(_))) => {
            outer.into_iter().next().unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(flattened)?)
}

#[async_trait]
impl SentimentClassifier for RemoteModel {
    fn name(&self) -> &str {
        SENTIMENT_MODEL
    }

    async fn classify(&self, text: &str) -> Result<Sentiment> {
        let request = InferenceRequest { inputs: text, parameters: None };
        let value: Value = self.post(SENTIMENT_MODEL, &request).await?.json().await?;
        let best = parse_label_scores(value)?
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| Error::Inference("empty sentiment response".to_string()))?;
        let label = SentimentLabel::from_model_label(&best.label)
            .ok_or_else(|| Error::Inference(format!("unknown sentiment label {}", best.label)))?;
        debug!("Remote sentiment {} ({:.3})", label, best.score);
        Ok(Sentiment::new(label, best.score))
    }
}

#[async_trait]
impl Summarizer for RemoteModel {
    fn name(&self) -> &str {
        SUMMARY_MODEL
    }

    async fn summarize(&self, text: &str, max_len: usize) -> Result<String> {
        let request = InferenceRequest {
            inputs: text,
            parameters: Some(SummaryParameters {
                max_length: max_len,
                min_length: MIN_SUMMARY_LENGTH.min(max_len),
                length_penalty: 2.0,
                num_beams: 4,
                early_stopping: true,
            }),
        };
        let outputs: Vec<SummaryOutput> = self.post(SUMMARY_MODEL, &request).await?.json().await?;
        outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text)
            .ok_or_else(|| Error::Inference("empty summary response".to_string()))
    }
}

#[async_trait]
impl SpeechSynthesizer for RemoteModel {
    fn name(&self) -> &str {
        SPEECH_MODEL
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = InferenceRequest { inputs: text, parameters: None };
        let bytes = self.post(SPEECH_MODEL, &request).await?.bytes().await?;
        if bytes.is_empty() {
            return Err(Error::Inference("speech endpoint returned no audio".to_string()));
        }
        Ok(bytes.to_vec())
    }
}
