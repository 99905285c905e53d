use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use na_core::{Error, Result, Translator};
use reqwest::Client;
use serde_json::Value;

pub const DEFAULT_TRANSLATE_URL: &str = "https://translate.googleapis.com";

/// Client for the public `translate_a/single` endpoint.
pub struct GoogleTranslator {
    client: Arc<Client>,
    base_url: String,
}

impl fmt::Debug for GoogleTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleTranslator")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GoogleTranslator {
    /// `timeout` bounds each request from connect to the last body byte.
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_TRANSLATE_URL.to_string());
        url::Url::parse(&base_url)?;
        Ok(Self {
            client: Arc::new(Client::builder().timeout(timeout).build()?),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// The response is `[[["translated", "source", ...], ...], ...]`; the
/// translation is every segment's first element joined together.
fn join_segments(value: &Value) -> Option<String> {
    let segments = value.get(0)?.as_array()?;
    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();
    Some(text)
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "GoogleTranslate"
    }

    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/translate_a/single", self.base_url))
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?;
        let value: Value = response.json().await?;
        join_segments(&value)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Localization("unexpected translation response".to_string()))
    }
}
