use std::fmt;

use na_core::prelude::*;
use tracing::warn;

use crate::models::ModelRegistry;

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(phrase: &str) -> String {
    let mut chars = phrase.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Per-article summarization, sentiment and topic extraction.
///
/// None of the operations fail: model errors degrade to the documented
/// defaults and are logged.
#[derive(Clone)]
pub struct ArticleAnalyzer {
    models: ModelRegistry,
    config: AnalyzerConfig,
}

impl fmt::Debug for ArticleAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleAnalyzer")
            .field("models", &self.models)
            .finish()
    }
}

impl ArticleAnalyzer {
    pub fn new(models: ModelRegistry, config: AnalyzerConfig) -> Self {
        Self { models, config }
    }

    pub async fn summarize(&self, text: &str, max_length: usize) -> String {
        let text = text.trim();
        if text.is_empty() {
            return String::new();
        }
        let input = truncate_chars(text, self.config.summary_input_limit);
        match self.models.summarizer.summarize(input, max_length).await {
            Ok(summary) => truncate_chars(summary.trim(), max_length).to_string(),
            Err(e) => {
                warn!("Summarization failed, falling back to truncation: {}", e);
                let cut = truncate_chars(text, max_length);
                if cut.len() < text.len() {
                    format!("{}...", cut)
                } else {
                    cut.to_string()
                }
            }
        }
    }

    pub async fn sentiment(&self, text: &str) -> Sentiment {
        let text = text.trim();
        if text.is_empty() {
            return Sentiment::default();
        }
        let input = truncate_chars(text, self.config.sentiment_input_limit);
        match self.models.sentiment.classify(input).await {
            Ok(sentiment) => Sentiment::new(sentiment.label, sentiment.score),
            Err(e) => {
                warn!("Sentiment analysis failed: {}", e);
                Sentiment::default()
            }
        }
    }

    pub async fn extract_topics(&self, text: &str, top_n: usize) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() || top_n == 0 {
            return Vec::new();
        }
        let input = truncate_chars(text, self.config.topic_input_limit);
        let keywords = match self.models.keywords.extract(input, top_n).await {
            Ok(keywords) => keywords,
            Err(e) => {
                warn!("Topic extraction failed: {}", e);
                return Vec::new();
            }
        };

        let mut topics: Vec<String> = Vec::with_capacity(top_n);
        for (phrase, _) in keywords {
            let topic = capitalize(phrase.trim());
            if !topic.is_empty() && !topics.contains(&topic) {
                topics.push(topic);
            }
            if topics.len() == top_n {
                break;
            }
        }
        topics
    }

    /// Turns extracted content into an analysis record. Content that failed
    /// extraction yields a record carrying the extraction error.
    pub async fn analyze(&self, content: &ExtractedContent) -> ArticleAnalysis {
        if !content.is_usable() {
            return ArticleAnalysis {
                title: content.title.clone(),
                summary: String::new(),
                sentiment: Sentiment::default(),
                topics: Vec::new(),
                url: content.source_url.clone(),
                analysis_error: Some(
                    content
                        .extraction_error
                        .clone()
                        .unwrap_or_else(|| "No content extracted".to_string()),
                ),
            };
        }

        let (summary, sentiment, topics) = tokio::join!(
            self.summarize(&content.body, self.config.summary_max_length),
            self.sentiment(&content.body),
            self.extract_topics(&content.body, self.config.top_n_topics),
        );

        ArticleAnalysis {
            title: content.title.clone(),
            summary,
            sentiment,
            topics,
            url: content.source_url.clone(),
            analysis_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use na_core::{KeywordExtractor, SentimentClassifier, Summarizer};

    use crate::models::DummyModel;

    #[derive(Debug)]
    struct FailingModel;

    #[async_trait::async_trait]
    impl SentimentClassifier for FailingModel {
        fn name(&self) -> &str {
            "Failing"
        }
        async fn classify(&self, _text: &str) -> Result<Sentiment> {
            Err(Error::Inference("model offline".to_string()))
        }
    }

    #[async_trait::async_trait]
    impl Summarizer for FailingModel {
        fn name(&self) -> &str {
            "Failing"
        }
        async fn summarize(&self, _text: &str, _max_len: usize) -> Result<String> {
            Err(Error::Inference("model offline".to_string()))
        }
    }

    #[async_trait::async_trait]
    impl KeywordExtractor for FailingModel {
        fn name(&self) -> &str {
            "Failing"
        }
        async fn extract(&self, _text: &str, _top_n: usize) -> Result<Vec<(String, f64)>> {
            Err(Error::Inference("model offline".to_string()))
        }
    }

    #[derive(Debug)]
    struct FixedModel;

    #[async_trait::async_trait]
    impl Summarizer for FixedModel {
        fn name(&self) -> &str {
            "Fixed"
        }
        async fn summarize(&self, _text: &str, _max_len: usize) -> Result<String> {
            Ok("x".repeat(400))
        }
    }

    #[async_trait::async_trait]
    impl KeywordExtractor for FixedModel {
        fn name(&self) -> &str {
            "Fixed"
        }
        async fn extract(&self, _text: &str, _top_n: usize) -> Result<Vec<(String, f64)>> {
            Ok(vec![
                ("ELECTRIC vehicles".to_string(), 1.0),
                ("electric Vehicles".to_string(), 0.9),
                ("battery".to_string(), 0.5),
            ])
        }
    }

    fn failing_analyzer() -> ArticleAnalyzer {
        let failing = Arc::new(FailingModel);
        let mut models = ModelRegistry::dummy();
        models.sentiment = failing.clone();
        models.summarizer = failing.clone();
        models.keywords = failing;
        ArticleAnalyzer::new(models, AnalyzerConfig::default())
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("electric VEHICLES"), "Electric vehicles");
        assert_eq!(capitalize("ébène"), "Ébène");
        assert_eq!(capitalize(""), "");
    }

    #[tokio::test]
    async fn test_empty_inputs_use_defaults() {
        let analyzer = ArticleAnalyzer::new(ModelRegistry::dummy(), AnalyzerConfig::default());
        assert_eq!(analyzer.summarize("", 150).await, "");
        assert_eq!(analyzer.sentiment("   ").await, Sentiment::new(SentimentLabel::Neutral, 0.5));
        assert!(analyzer.extract_topics("", 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_failures_degrade_to_defaults() {
        let analyzer = failing_analyzer();
        let long_text = "a".repeat(200);

        assert_eq!(analyzer.summarize(&long_text, 150).await, format!("{}...", "a".repeat(150)));
        assert_eq!(analyzer.summarize("short text", 150).await, "short text");
        assert_eq!(analyzer.sentiment("anything").await, Sentiment::default());
        assert!(analyzer.extract_topics("anything", 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_truncation_respects_code_points() {
        let analyzer = failing_analyzer();
        let summary = analyzer.summarize(&"है".repeat(100), 10).await;
        assert_eq!(summary.chars().count(), 13);
    }

    #[tokio::test]
    async fn test_long_model_output_is_cut_and_topics_deduplicated() {
        let fixed = Arc::new(FixedModel);
        let mut models = ModelRegistry::dummy();
        models.summarizer = fixed.clone();
        models.keywords = fixed;
        let analyzer = ArticleAnalyzer::new(models, AnalyzerConfig::default());

        assert_eq!(analyzer.summarize("body", 150).await.chars().count(), 150);
        assert_eq!(
            analyzer.extract_topics("body", 5).await,
            vec!["Electric vehicles".to_string(), "Battery".to_string()]
        );
    }

    #[tokio::test]
    async fn test_stalled_remote_model_degrades() {
        use std::time::{Duration, Instant};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([[{"label": "LABEL_2", "score": 0.9}]]))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;
        let models = crate::create_models(&crate::InferenceConfig {
            model: "remote".to_string(),
            model_url: Some(server.uri()),
            timeout: Duration::from_millis(200),
            ..Default::default()
        })
        .unwrap();
        let analyzer = ArticleAnalyzer::new(models, AnalyzerConfig::default());

        let started = Instant::now();
        assert_eq!(analyzer.sentiment("Profits soared").await, Sentiment::default());
        assert_eq!(analyzer.summarize("Profits soared.", 150).await, "Profits soared.");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_analyze_carries_extraction_error() {
        let analyzer = ArticleAnalyzer::new(ModelRegistry::dummy(), AnalyzerConfig::default());
        let failed = ExtractedContent::failed("https://a.example/1", "HTTP 404");
        let analysis = analyzer.analyze(&failed).await;
        assert!(!analysis.is_valid());
        assert_eq!(analysis.analysis_error.as_deref(), Some("HTTP 404"));
    }

    #[tokio::test]
    async fn test_analyze_builds_record() {
        let model = Arc::new(DummyModel::new());
        let analyzer = ArticleAnalyzer::new(ModelRegistry::dummy(), AnalyzerConfig::default());
        let content = ExtractedContent::extracted(
            "https://a.example/1",
            RawArticle {
                title: "Tesla opens factory".to_string(),
                body: "Tesla opened a factory in Berlin.".to_string(),
            },
        );
        let analysis = analyzer.analyze(&content).await;
        assert!(analysis.is_valid());
        assert_eq!(analysis.title, "Tesla opens factory");
        assert_eq!(analysis.url, "https://a.example/1");
        assert_eq!(analysis.summary, "Tesla opened a factory in Berlin.");
        assert_eq!(analysis.sentiment, model.classify("").await.unwrap());
        assert_eq!(analysis.topics[0], "Tesla");
    }
}
