use std::fmt;
use std::sync::Arc;

use na_core::prelude::*;
use na_core::{NewsFeedClient, PageFetcher, TaskRegistry};
use na_inference::{aggregate, ArticleAnalyzer, Localizer, ModelRegistry};

use crate::extract::ContentExtractor;
use crate::feed::SourceResolver;
use crate::logging::Logger;
use crate::manager::ArticlePipeline;

/// End-to-end analysis of one company's news coverage.
#[derive(Clone)]
pub struct NewsAnalyzer {
    resolver: SourceResolver,
    pipeline: ArticlePipeline,
    localizer: Localizer,
    config: AnalyzerConfig,
}

impl fmt::Debug for NewsAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsAnalyzer")
            .field("resolver", &self.resolver)
            .field("pipeline", &self.pipeline)
            .field("localizer", &self.localizer)
            .finish()
    }
}

/// Where a tracked run reports its stage transitions.
struct Progress<'a> {
    tasks: Option<(&'a dyn TaskRegistry, &'a str)>,
    logger: &'a Logger,
}

impl Progress<'_> {
    async fn advance(&self, stage: RunStage) {
        self.logger.debug(&format!("stage {:?}", stage));
        if let Some((tasks, task_id)) = self.tasks {
            if let Err(e) = tasks.advance(task_id, stage).await {
                self.logger.warn(&format!("Could not record stage {:?}: {}", stage, e));
            }
        }
    }
}

impl NewsAnalyzer {
    pub fn new(
        resolver: SourceResolver,
        pipeline: ArticlePipeline,
        localizer: Localizer,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            resolver,
            pipeline,
            localizer,
            config,
        }
    }

    /// Wires resolver, extractor, analyzer and localizer around shared clients.
    pub fn build(
        config: AnalyzerConfig,
        models: ModelRegistry,
        feed: Arc<dyn NewsFeedClient>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        let resolver = SourceResolver::new(feed, fetcher.clone(), config.clone());
        let extractor = ContentExtractor::with_readability(fetcher, config.clone());
        let analyzer = ArticleAnalyzer::new(models.clone(), config.clone());
        let pipeline = ArticlePipeline::new(extractor, analyzer, &config);
        let localizer = Localizer::new(models, config.clone());
        Self::new(resolver, pipeline, localizer, config)
    }

    pub fn resolver(&self) -> &SourceResolver {
        &self.resolver
    }

    pub async fn extract(&self, url: &str) -> ExtractedContent {
        self.pipeline.extractor().extract(url).await
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Runs the full analysis. Run-level failures come back as an error report.
    pub async fn analyze_company(&self, company: &str) -> CompanyReport {
        let logger = Logger::for_company(company);
        self.run(company, Progress { tasks: None, logger: &logger }).await
    }

    /// Same as [`NewsAnalyzer::analyze_company`], recording each stage on `task_id`.
    pub async fn analyze_tracked(
        &self,
        company: &str,
        tasks: &dyn TaskRegistry,
        task_id: &str,
    ) -> CompanyReport {
        let logger = Logger::for_company(company);
        let progress = Progress {
            tasks: Some((tasks, task_id)),
            logger: &logger,
        };
        self.run(company, progress).await
    }

    async fn run(&self, company: &str, progress: Progress<'_>) -> CompanyReport {
        let logger = progress.logger;
        logger.info("🚀 Starting news analysis");

        progress.advance(RunStage::Resolving).await;
        let urls = self.resolver.resolve(company, self.config.max_results).await;
        if urls.is_empty() {
            logger.warn("No news articles found");
            return CompanyReport::failed(company, Error::NoArticlesFound);
        }
        logger.info(&format!("🔗 Resolved {} article URLs", urls.len()));

        progress.advance(RunStage::Extracting).await;
        let articles = match self.pipeline.run(&urls, logger).await {
            Ok(articles) => articles,
            Err(e) => {
                logger.warn(&e.to_string());
                return CompanyReport::failed(company, e);
            }
        };

        progress.advance(RunStage::Aggregating).await;
        let comparative = aggregate(&articles);
        let final_verdict = comparative.final_verdict.clone();
        logger.info(&format!("📊 {}", final_verdict));

        progress.advance(RunStage::Localizing).await;
        let localized_verdict = self.localizer.localize_verdict(company, &final_verdict).await;

        progress.advance(RunStage::Narrating).await;
        let narration_audio = self.localizer.narrate(&localized_verdict).await;

        logger.info(&format!(
            "✅ Analysis complete: {} articles, {} bytes of audio",
            articles.len(),
            narration_audio.len()
        ));
        CompanyAnalysisResult {
            company_name: company.to_string(),
            articles,
            comparative,
            final_verdict,
            localized_verdict,
            narration_audio,
        }
        .into()
    }
}
