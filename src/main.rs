//! CLI batch entry point
//!
//! Scrapes the configured search URL, analyzes the prices, and writes
//! the average to a result file. Progress goes to stdout; the tracing
//! stream goes to the log file only.

use anyhow::{Context, Result};
use serde_json::json;
use tracing::error;

use soldscope::application::analyzer::{OutlierPolicy, PriceAnalyzer};
use soldscope::application::scraper::SoldListingsScraper;
use soldscope::infrastructure::config::{defaults, ConfigError, ConfigManager};
use soldscope::infrastructure::logging::init_logging;

#[tokio::main]
async fn main() {
    println!("eBay Price Scraper");
    println!("{}", "=".repeat(30));

    if let Err(e) = run().await {
        error!("An error occurred: {:#}", e);
        println!("An error occurred: {e}");
        println!("Check logs/scraper.log for more details.");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let manager = ConfigManager::default();
    let config = match manager.load().await {
        Ok(config) => config,
        Err(ConfigError::NotFound(_)) => {
            println!("Config file not found. Please create config.json with your eBay URL.");
            return Ok(());
        }
        Err(ConfigError::Malformed(_)) => {
            println!("Error reading config.json. Please check the file format.");
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to read configuration"),
    };

    // File-only logging keeps stdout clean for progress text
    init_logging(&config.logging, false)?;

    // A command-line argument overrides the configured URL
    let url = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => config.ebay_url.trim().to_string(),
    };

    if url.is_empty() {
        println!("Please add an eBay URL to config.json");
        println!("Example: {{\"ebay_url\": \"your-ebay-url-here\"}}");
        return Ok(());
    }

    println!("Using URL from config: {:.50}...", url);
    println!("Scraping data...");

    let scraper = SoldListingsScraper::from_config(&config)?;
    let listings = scraper.scrape(&url, config.max_pages).await;

    if listings.is_empty() {
        println!("No listings found. Please check the URL or try again later.");
        return Ok(());
    }

    let analyzer = PriceAnalyzer::new(&listings, OutlierPolicy::from(config.outlier));
    match analyzer.calculate_statistics() {
        Some(stats) => {
            let average_price = (stats.average * 100.0).round() / 100.0;

            let result = json!({ "average_price": average_price });
            tokio::fs::write(
                defaults::RESULT_FILE,
                serde_json::to_string_pretty(&result)?,
            )
            .await
            .with_context(|| format!("Failed to write {}", defaults::RESULT_FILE))?;

            println!("{}", analyzer.summary_text());
            println!("Average price: ${average_price}");
            println!("Result saved to {}", defaults::RESULT_FILE);
        }
        None => {
            println!("No valid price data found for analysis.");
        }
    }

    Ok(())
}
