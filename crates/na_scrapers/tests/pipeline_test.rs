//! End-to-end runs against a mocked news feed, publisher pages, translator
//! and speech endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use na_core::{
    AnalysisCache, CompanyAnalysisResult, CompanyReport, ComparativeResult, Error, RunStage,
    SentimentDistribution, SentimentLabel, TopicOverlap,
};
use na_inference::{create_models, InferenceConfig};
use na_scrapers::{AnalysisService, GoogleNewsClient, HttpFetcher, NewsAnalyzer, StartOutcome};
use na_storage::{create_storage, MemoryConfig, MemoryTaskRegistry, Storage};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POSITIVE_PAGE: &str = r#"<html><head><title>Tesla soars | Example News</title></head><body>
<nav><p>Home Markets Tech Autos Opinion Video</p></nav>
<article>
<p>Tesla shares surged after the company reported record profits for the quarter.</p>
<p>Strong demand for electric vehicles boosted growth across every region.</p>
<p>Analysts praised the strong quarter and raised their targets.</p>
</article>
<footer><p>Copyright Example News all rights reserved worldwide</p></footer>
</body></html>"#;

const NEGATIVE_PAGE: &str = r#"<html><head>
<meta property="og:title" content="Regulators probe Tesla crash">
<title>Example Wire</title></head><body>
<main>
<p>Regulators opened a probe after a crash involving driver assistance software.</p>
<p>The automaker faces a lawsuit and mounting losses this year.</p>
<p>Investors worry about further recalls in the coming months.</p>
</main>
</body></html>"#;

const EMPTY_PAGE: &str = "<html><body><nav><p>Menu</p></nav></body></html>";

const HINDI_TEXT: &str = "टेस्ला के बारे में समाचार विश्लेषण: मिश्रित";

fn feed_xml(server: &MockServer, ids: &[u32]) -> String {
    let items: String = ids
        .iter()
        .map(|id| {
            format!(
                "<item><title>Story {id}</title><link>{}/rss/articles/{id}</link></item>",
                server.uri()
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>Google News</title><link>https://news.google.com</link><description>Search</description>{}</channel></rss>"#,
        items
    )
}

async fn mount_redirect(server: &MockServer, id: u32, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/rss/articles/{}", id)))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/news/{}", server.uri(), id).as_str()),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/news/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_localization(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([[[HINDI_TEXT, "source", null]], null, "en"])),
        )
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/facebook/mms-tts-hin$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFFDATA".to_vec()))
        .mount(server)
        .await;
}

async fn mount_feed(server: &MockServer, ids: &[u32]) {
    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(feed_xml(server, ids))
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .mount(server)
        .await;
}

fn analyzer_for(server: &MockServer) -> NewsAnalyzer {
    let models = create_models(&InferenceConfig {
        model: "builtin".to_string(),
        model_url: Some(server.uri()),
        translate_url: Some(server.uri()),
        api_key: None,
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    NewsAnalyzer::build(
        Default::default(),
        models,
        Arc::new(GoogleNewsClient::new(Some(server.uri()), Duration::from_secs(5)).unwrap()),
        Arc::new(HttpFetcher::new().unwrap()),
    )
}

fn service_for(server: &MockServer) -> AnalysisService {
    let analyzer = analyzer_for(server);
    AnalysisService::new(
        analyzer,
        create_storage("memory", 8).unwrap(),
        Default::default(),
    )
}

async fn wait_for_completion(service: &AnalysisService, task_id: &str) -> CompanyReport {
    for _ in 0..100 {
        let task = service.get_status(task_id).await.unwrap();
        if task.completed {
            assert_eq!(task.stage, RunStage::Completed);
            return task.report.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("task {} never completed", task_id);
}

#[tokio::test]
async fn test_tesla_mixed_coverage() {
    let server = MockServer::start().await;
    mount_feed(&server, &[1, 2, 3]).await;
    mount_redirect(&server, 1, POSITIVE_PAGE).await;
    mount_redirect(&server, 2, NEGATIVE_PAGE).await;
    mount_redirect(&server, 3, EMPTY_PAGE).await;
    mount_localization(&server).await;

    let report = analyzer_for(&server).analyze_company("Tesla").await;
    let result = report.result().expect("analysis should succeed");

    assert_eq!(result.company_name, "Tesla");
    assert_eq!(result.articles.len(), 2);
    assert_eq!(result.articles[0].url, format!("{}/news/1", server.uri()));
    assert_eq!(result.articles[1].url, format!("{}/news/2", server.uri()));
    assert_eq!(result.articles[0].title, "Tesla soars | Example News");
    assert_eq!(result.articles[1].title, "Regulators probe Tesla crash");
    assert_eq!(result.articles[0].sentiment.label, SentimentLabel::Positive);
    assert_eq!(result.articles[1].sentiment.label, SentimentLabel::Negative);
    for article in &result.articles {
        assert!(article.summary.chars().count() <= 150);
        assert!(!article.summary.is_empty());
        assert!(article.topics.len() <= 5);
    }

    let comparative = &result.comparative;
    assert_eq!(comparative.sentiment_distribution.count(SentimentLabel::Positive), 1);
    assert_eq!(comparative.sentiment_distribution.count(SentimentLabel::Negative), 1);
    assert_eq!(comparative.sentiment_distribution.count(SentimentLabel::Neutral), 0);
    assert!(comparative.topic_overlap.common_topics.is_empty());
    assert_eq!(result.articles[0].topics[0], "Quarter");
    assert!(!result.articles[1].topics.contains(&"Tesla".to_string()));
    assert_eq!(comparative.coverage_differences.len(), 1);
    assert_eq!(
        comparative.coverage_differences[0].comparison,
        "Article 1 has a positive sentiment, while Article 2 has a negative sentiment."
    );
    assert_eq!(
        result.final_verdict,
        "The company's latest news coverage is mixed. \
         The situation appears complex with both positive and negative aspects."
    );
    assert_eq!(result.localized_verdict, HINDI_TEXT);
    assert_eq!(result.narration_audio, b"RIFFDATA".to_vec());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["Company"], "Tesla");
    assert_eq!(json["Audio"], "UklGRkRBVEE=");
    assert_eq!(json["Hindi Text"], HINDI_TEXT);
    assert_eq!(
        json["Comparative Sentiment Score"]["Sentiment Distribution"],
        serde_json::json!({"POSITIVE": 1, "NEGATIVE": 1, "NEUTRAL": 0})
    );
    assert_eq!(
        json["Comparative Sentiment Score"]["Topic Overlap"]["Common Topics"],
        serde_json::json!([])
    );
}

#[tokio::test]
async fn test_localization_failures_degrade() {
    let server = MockServer::start().await;
    mount_feed(&server, &[1]).await;
    mount_redirect(&server, 1, POSITIVE_PAGE).await;
    // No translator or speech mocks: both return 404.

    let report = analyzer_for(&server).analyze_company("Tesla").await;
    let result = report.result().unwrap();

    assert!(result.final_verdict.contains("mostly positive"));
    assert!(result.localized_verdict.starts_with("Tesla के बारे में समाचार विश्लेषण:"));
    assert!(result.narration_audio.is_empty());
    assert_eq!(serde_json::to_value(&report).unwrap()["Audio"], "");
}

#[tokio::test]
async fn test_no_articles_found() {
    let server = MockServer::start().await;
    mount_feed(&server, &[]).await;

    let report = analyzer_for(&server).analyze_company("Unknown Co").await;
    assert_eq!(report.error(), Some(Error::NoArticlesFound.to_string().as_str()));
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        serde_json::json!({"Company": "Unknown Co", "error": "No news articles found for this company"})
    );
}

#[tokio::test]
async fn test_all_extractions_fail() {
    let server = MockServer::start().await;
    mount_feed(&server, &[1, 2]).await;
    mount_redirect(&server, 1, EMPTY_PAGE).await;
    mount_redirect(&server, 2, EMPTY_PAGE).await;

    let report = analyzer_for(&server).analyze_company("Tesla").await;
    assert_eq!(
        report.error(),
        Some("Could not process any articles for this company")
    );
}

#[tokio::test]
async fn test_service_single_flight_and_cache() {
    let server = MockServer::start().await;
    mount_feed(&server, &[1, 2]).await;
    mount_redirect(&server, 1, POSITIVE_PAGE).await;
    mount_redirect(&server, 2, NEGATIVE_PAGE).await;
    mount_localization(&server).await;

    let service = service_for(&server);

    let first = service.start_analysis("Tesla").await.unwrap();
    let second = service.start_analysis("Tesla").await.unwrap();
    assert!(matches!(first, StartOutcome::Processing { started: true, .. }));
    assert!(matches!(second, StartOutcome::Processing { started: false, .. }));
    assert_eq!(first.task_id(), "task_tesla");
    assert_eq!(second.task_id(), "task_tesla");

    let report = wait_for_completion(&service, "task_tesla").await;
    assert!(report.result().is_some());

    assert_eq!(service.list_cached_companies().await.unwrap(), vec!["Tesla".to_string()]);
    match service.start_analysis("  tesla ").await.unwrap() {
        StartOutcome::Cached { result, .. } => assert_eq!(result.company_name, "Tesla"),
        other => panic!("expected cached result, got {:?}", other),
    }
}

#[tokio::test]
async fn test_service_failed_runs_are_not_cached() {
    let server = MockServer::start().await;
    mount_feed(&server, &[]).await;

    let service = service_for(&server);
    let outcome = service.start_analysis("Nobody Inc").await.unwrap();
    assert_eq!(outcome.task_id(), "task_nobody_inc");

    let report = wait_for_completion(&service, "task_nobody_inc").await;
    assert!(report.error().is_some());
    assert!(service.list_cached_companies().await.unwrap().is_empty());

    // A finished failure can be retried.
    assert!(matches!(
        service.start_analysis("Nobody Inc").await.unwrap(),
        StartOutcome::Processing { started: true, .. }
    ));
}

#[tokio::test]
async fn test_service_rejects_bad_input() {
    let server = MockServer::start().await;
    let service = service_for(&server);

    assert!(matches!(
        service.start_analysis("   ").await,
        Err(Error::InvalidCompanyName)
    ));
    assert!(matches!(
        service.get_status("task_missing").await,
        Err(Error::TaskNotFound(_))
    ));
}

#[tokio::test]
async fn test_service_spacing_variants_share_a_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(feed_xml(&server, &[]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let service = service_for(&server);
    let first = service.start_analysis("Tesla Inc").await.unwrap();
    let second = service.start_analysis("tesla   INC").await.unwrap();

    assert!(matches!(first, StartOutcome::Processing { started: true, .. }));
    assert!(matches!(second, StartOutcome::Processing { started: false, .. }));
    assert_eq!(first.task_id(), "task_tesla_inc");
    assert_eq!(second.task_id(), "task_tesla_inc");
    wait_for_completion(&service, "task_tesla_inc").await;
}

/// Misses on the first lookup, as if a run finished right after it.
struct LateCache {
    lookups: AtomicUsize,
}

#[async_trait]
impl AnalysisCache for LateCache {
    async fn get(&self, company: &str) -> na_core::Result<Option<CompanyAnalysisResult>> {
        if self.lookups.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(None);
        }
        Ok(Some(CompanyAnalysisResult {
            company_name: company.to_string(),
            articles: vec![],
            comparative: ComparativeResult {
                sentiment_distribution: SentimentDistribution::default(),
                coverage_differences: vec![],
                topic_overlap: TopicOverlap::default(),
                final_verdict: String::new(),
            },
            final_verdict: String::new(),
            localized_verdict: String::new(),
            narration_audio: vec![],
        }))
    }

    async fn insert(&self, _company: &str, _result: CompanyAnalysisResult) -> na_core::Result<()> {
        Ok(())
    }

    async fn companies(&self) -> na_core::Result<Vec<String>> {
        Ok(vec![])
    }
}

#[tokio::test]
async fn test_service_rechecks_cache_after_claiming_task() {
    let server = MockServer::start().await;
    let storage = Storage {
        cache: Arc::new(LateCache {
            lookups: AtomicUsize::new(0),
        }),
        tasks: Arc::new(MemoryTaskRegistry::new(MemoryConfig::new(8))),
    };
    let service = AnalysisService::new(analyzer_for(&server), storage, Default::default());

    match service.start_analysis("Tesla").await.unwrap() {
        StartOutcome::Cached { task_id, result } => {
            assert_eq!(task_id, "task_tesla");
            assert_eq!(result.company_name, "Tesla");
        }
        other => panic!("expected cached result, got {:?}", other),
    }

    let task = service.get_status("task_tesla").await.unwrap();
    assert!(task.completed);
    assert!(task.report.unwrap().result().is_some());
    // No run was started, so the feed was never queried.
    assert!(server.received_requests().await.unwrap().is_empty());
}
