use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use na_core::{AnalyzerConfig, Error, NewsFeedClient, PageFetcher, Result};
use reqwest::Client;
use rss::Channel;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub const GOOGLE_NEWS_URL: &str = "https://news.google.com";

/// Google News RSS search.
#[derive(Clone)]
pub struct GoogleNewsClient {
    client: Client,
    base_url: String,
}

impl fmt::Debug for GoogleNewsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleNewsClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GoogleNewsClient {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.unwrap_or_else(|| GOOGLE_NEWS_URL.to_string());
        url::Url::parse(&base_url)?;
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl NewsFeedClient for GoogleNewsClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let content = self
            .client
            .get(format!("{}/rss/search", self.base_url))
            .query(&[("q", query), ("hl", "en-US"), ("gl", "US"), ("ceid", "US:en")])
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let channel = Channel::read_from(&content[..])
            .map_err(|e| Error::Feed(format!("Failed to parse news feed: {}", e)))?;

        Ok(channel
            .items()
            .iter()
            .filter_map(|item| item.link())
            .map(|link| link.trim().to_string())
            .filter(|link| !link.is_empty())
            .take(limit)
            .collect())
    }
}

/// Turns a company name into the final URLs of its news articles.
#[derive(Clone)]
pub struct SourceResolver {
    feed: Arc<dyn NewsFeedClient>,
    fetcher: Arc<dyn PageFetcher>,
    config: AnalyzerConfig,
}

impl fmt::Debug for SourceResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceResolver")
            .field("feed", &self.feed)
            .field("fetcher", &self.fetcher)
            .finish()
    }
}

impl SourceResolver {
    pub fn new(
        feed: Arc<dyn NewsFeedClient>,
        fetcher: Arc<dyn PageFetcher>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            feed,
            fetcher,
            config,
        }
    }

    /// Never fails: an unreachable feed yields no URLs and failed redirects
    /// drop their candidate. Output keeps feed order without duplicates.
    pub async fn resolve(&self, company: &str, max_results: usize) -> Vec<String> {
        let links = match self.feed.search(company, max_results).await {
            Ok(links) => links,
            Err(e) => {
                warn!("❌ News feed query for {} failed: {}", company, e);
                return Vec::new();
            }
        };
        info!("🔎 Feed returned {} entries for {}", links.len(), company);

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let timeout = self.config.redirect_timeout;
        let follows = links.into_iter().take(max_results).map(|link| {
            let semaphore = semaphore.clone();
            let fetcher = self.fetcher.clone();
            async move {
                let _permit = semaphore.acquire().await.ok()?;
                match fetcher.resolve(&link, timeout).await {
                    Ok(url) => {
                        debug!("🔗 {} -> {}", link, url);
                        Some(url)
                    }
                    Err(e) => {
                        warn!("⚠️ Dropping {}: {}", link, e);
                        None
                    }
                }
            }
        });

        let mut seen = HashSet::new();
        join_all(follows)
            .await
            .into_iter()
            .flatten()
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }
}
