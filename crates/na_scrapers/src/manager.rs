use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use na_core::prelude::*;
use na_inference::ArticleAnalyzer;
use tokio::sync::Semaphore;
use tracing::info;

use crate::extract::ContentExtractor;
use crate::logging::Logger;

/// Fans candidate URLs out to bounded workers that extract and analyze each
/// article, then reassembles the valid results in input order.
#[derive(Clone)]
pub struct ArticlePipeline {
    extractor: ContentExtractor,
    analyzer: ArticleAnalyzer,
    concurrency: usize,
    max_articles: usize,
}

impl fmt::Debug for ArticlePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticlePipeline")
            .field("extractor", &self.extractor)
            .field("analyzer", &self.analyzer)
            .field("concurrency", &self.concurrency)
            .field("max_articles", &self.max_articles)
            .finish()
    }
}

impl ArticlePipeline {
    pub fn new(extractor: ContentExtractor, analyzer: ArticleAnalyzer, config: &AnalyzerConfig) -> Self {
        Self {
            extractor,
            analyzer,
            concurrency: config.concurrency.max(1),
            max_articles: config.max_articles,
        }
    }

    pub fn extractor(&self) -> &ContentExtractor {
        &self.extractor
    }

    async fn process_url(
        extractor: ContentExtractor,
        analyzer: ArticleAnalyzer,
        semaphore: Arc<Semaphore>,
        url: String,
        logger: Logger,
    ) -> Result<ArticleAnalysis> {
        let _permit = semaphore
            .acquire_owned()
            .await
            .map_err(|e| Error::External(e.into()))?;

        logger.debug(&format!("📥 Extracting {}", url));
        let content = extractor.extract(&url).await;
        if let Some(reason) = &content.extraction_error {
            return Err(Error::Extraction(reason.clone()));
        }

        logger.debug(&format!("🤖 Analyzing {}", url));
        let analysis = analyzer.analyze(&content).await;
        match &analysis.analysis_error {
            Some(reason) => Err(Error::Inference(reason.clone())),
            None => Ok(analysis),
        }
    }

    /// Processes at most `max_articles` URLs with a worker pool of its own. A
    /// failing or panicking URL is logged and dropped without affecting its
    /// siblings.
    pub async fn run(&self, urls: &[String], logger: &Logger) -> Result<Vec<ArticleAnalysis>> {
        let urls: Vec<String> = urls.iter().take(self.max_articles).cloned().collect();
        logger.info(&format!("📰 Processing {} articles", urls.len()));
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let handles: Vec<_> = urls
            .iter()
            .map(|url| {
                tokio::spawn(Self::process_url(
                    self.extractor.clone(),
                    self.analyzer.clone(),
                    semaphore.clone(),
                    url.clone(),
                    logger.clone(),
                ))
            })
            .collect();

        let mut articles = Vec::with_capacity(urls.len());
        for (url, joined) in urls.iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(analysis)) => articles.push(analysis),
                Ok(Err(e)) => logger.warn(&format!("⚠️ Skipping {}: {}", url, e)),
                Err(e) => logger.error(&format!("💥 Worker for {} crashed: {}", url, e)),
            }
        }

        info!("✅ {} of {} articles processed", articles.len(), urls.len());
        if articles.is_empty() {
            return Err(Error::NoArticlesProcessed);
        }
        Ok(articles)
    }
}
