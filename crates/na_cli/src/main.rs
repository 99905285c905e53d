use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use na_core::AnalyzerConfig;
use na_inference::{create_models, InferenceConfig};
use na_scrapers::{handle_command, init_logging, AnalysisService, GoogleNewsClient, HttpFetcher, NewsAnalyzer, ScraperCommands};
use na_web::AppState;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    'd' => total_seconds += num * 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A bare number means seconds
        if !current_number.is_empty() {
            match current_number.parse::<u64>() {
                Ok(num) => {
                    total_seconds += num;
                    has_unit = true;
                }
                Err(_) => return Err("Invalid number in duration".to_string()),
            }
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Company news sentiment analyzer", long_about = None)]
struct Cli {
    #[arg(long, default_value = "memory", help = "Cache backend. Available backends: memory")]
    storage: String,
    #[arg(long, env = "NA_CACHE_CAPACITY", default_value_t = 64)]
    cache_capacity: usize,
    #[arg(
        long,
        env = "NA_MODEL",
        default_value = "builtin",
        help = "Model backend. Available models: builtin (default), remote, dummy"
    )]
    model: String,
    /// Base URL of the hosted inference endpoint
    #[arg(long, env = "NA_MODEL_URL")]
    model_url: Option<String>,
    #[arg(long, env = "NA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "NA_TRANSLATE_URL")]
    translate_url: Option<String>,
    /// Base URL of the Google News RSS service
    #[arg(long, env = "NA_FEED_URL")]
    feed_url: Option<String>,
    #[arg(long, default_value_t = 15)]
    max_results: usize,
    #[arg(long, default_value_t = 10)]
    max_articles: usize,
    /// Articles fetched and analyzed at once
    #[arg(long, default_value_t = 5)]
    concurrency: usize,
    #[arg(long, default_value = "5s")]
    redirect_timeout: HumanDuration,
    #[arg(long, default_value = "10s")]
    fetch_timeout: HumanDuration,
    #[arg(long, default_value = "10s")]
    feed_timeout: HumanDuration,
    /// Bound on each hosted model or translator request
    #[arg(long, default_value = "30s")]
    model_timeout: HumanDuration,
    #[arg(long, default_value = "hi")]
    language: String,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Scrape(ScraperCommands),
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "NA_BIND", default_value = "0.0.0.0:8000")]
        bind: SocketAddr,
    },
}

impl Cli {
    fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            max_results: self.max_results,
            max_articles: self.max_articles,
            concurrency: self.concurrency,
            redirect_timeout: self.redirect_timeout.0,
            fetch_timeout: self.fetch_timeout.0,
            feed_timeout: self.feed_timeout.0,
            target_language: self.language.clone(),
            cache_capacity: self.cache_capacity,
            ..Default::default()
        }
    }

    fn inference_config(&self) -> InferenceConfig {
        InferenceConfig {
            model: self.model.clone(),
            model_url: self.model_url.clone(),
            translate_url: self.translate_url.clone(),
            api_key: self.api_key.clone(),
            timeout: self.model_timeout.0,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.analyzer_config();
    let models = create_models(&cli.inference_config())?;
    info!("🧠 Inference models initialized (using {})", cli.model);

    let storage = na_storage::create_storage(&cli.storage, config.cache_capacity)?;
    info!("💾 Cache initialized (using {}, capacity {})", cli.storage, config.cache_capacity);

    let feed = GoogleNewsClient::new(cli.feed_url.clone(), config.feed_timeout)?;
    let analyzer = NewsAnalyzer::build(
        config,
        models.clone(),
        Arc::new(feed),
        Arc::new(HttpFetcher::new()?),
    );
    let service = AnalysisService::new(analyzer, storage, models.names());

    match cli.command {
        Commands::Scrape(command) => handle_command(command, &service).await?,
        Commands::Serve { bind } => na_web::serve(bind, AppState::new(service)).await?,
    }

    Ok(())
}
