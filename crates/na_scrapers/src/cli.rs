use clap::Subcommand;
use na_core::prelude::*;

use crate::service::AnalysisService;

#[derive(Subcommand, Debug)]
pub enum ScraperCommands {
    /// Analyze recent news coverage of a company
    Analyze {
        /// Company name, e.g. "Tesla"
        company: String,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the article URLs found for a company
    Urls {
        company: String,
    },
    /// Extract the title and body of a single article
    Extract {
        url: String,
    },
}

fn print_report(report: &CompanyReport) {
    let Some(result) = report.result() else {
        eprintln!(
            "❌ {}: {}",
            report.company_name(),
            report.error().unwrap_or_default()
        );
        return;
    };

    println!("🏢 {}", result.company_name);
    for (i, article) in result.articles.iter().enumerate() {
        println!(
            "{}. {} [{} {:.2}]",
            i + 1,
            article.title,
            article.sentiment.label,
            article.sentiment.score
        );
        println!("   {}", article.url);
        println!("   {}", article.summary);
        if !article.topics.is_empty() {
            println!("   🏷️  {}", article.topics.join(", "));
        }
    }

    let comparative = &result.comparative;
    let distribution = &comparative.sentiment_distribution;
    println!(
        "📊 positive {} / negative {} / neutral {}",
        distribution.positive, distribution.negative, distribution.neutral
    );
    for difference in &comparative.coverage_differences {
        println!("↔️  {}", difference.comparison);
    }
    if !comparative.topic_overlap.common_topics.is_empty() {
        println!(
            "🔁 Common topics: {}",
            comparative.topic_overlap.common_topics.join(", ")
        );
    }
    println!("🧾 {}", result.final_verdict);
    println!("🗣️  {}", result.localized_verdict);
    println!("🔊 {} bytes of audio", result.narration_audio.len());
}

pub async fn handle_command(command: ScraperCommands, service: &AnalysisService) -> Result<()> {
    match command {
        ScraperCommands::Analyze { company, json } => {
            let report = service.analyze_now(&company).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        ScraperCommands::Urls { company } => {
            let analyzer = service.analyzer();
            let urls = analyzer
                .resolver()
                .resolve(company.trim(), analyzer.config().max_results)
                .await;
            println!("Found {} articles", urls.len());
            for url in urls {
                println!("🔗 {}", url);
            }
        }
        ScraperCommands::Extract { url } => {
            url::Url::parse(&url)?;
            let content = service.analyzer().extract(&url).await;
            match content.extraction_error {
                Some(reason) => {
                    return Err(Error::Extraction(format!("Failed to extract {}: {}", url, reason)))
                }
                None => {
                    println!("📰 {}", content.title);
                    println!();
                    println!("{}", content.body);
                }
            }
        }
    }
    Ok(())
}
