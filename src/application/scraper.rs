//! Scrape orchestrator for paginated sold-listings results
//!
//! Drives the fetcher and extractor across a bounded page range with a
//! politeness delay between pages. Stops early on a fetch failure or an
//! empty page and always hands back whatever was collected so far.

use std::time::Duration;

use anyhow::Result;
use scraper::Html;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::ListingRecord;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http_client::{HttpClient, HttpClientConfig};
use crate::infrastructure::parsing::ListingParser;

/// Scraper for sold listings, owning one HTTP session per scrape call.
pub struct SoldListingsScraper {
    http: HttpClient,
    parser: ListingParser,
    delay: Duration,
}

impl SoldListingsScraper {
    pub fn new(http: HttpClient, parser: ListingParser, delay: Duration) -> Self {
        Self {
            http,
            parser,
            delay,
        }
    }

    /// Build a scraper from the application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = HttpClient::new(HttpClientConfig {
            user_agent: config.user_agent.clone(),
            timeout_seconds: config.request_timeout_seconds,
            follow_redirects: true,
        })?;
        let parser = ListingParser::with_selectors(&config.selectors, config.price_band)?;

        Ok(Self::new(http, parser, Duration::from_millis(config.request_delay_ms)))
    }

    /// Scrape sold listings across at most `max_pages` result pages.
    ///
    /// Never fails: a fetch error ends pagination and the partial
    /// aggregate collected so far is returned, possibly empty.
    pub async fn scrape(&self, url: &str, max_pages: u32) -> Vec<ListingRecord> {
        self.scrape_with_cancellation(url, max_pages, &CancellationToken::new())
            .await
    }

    /// Scrape with caller-driven abort.
    ///
    /// The token is honored at the top of each per-page iteration and at
    /// every await point inside the fetch, so cancellation never waits
    /// out a request timeout or a politeness delay.
    pub async fn scrape_with_cancellation(
        &self,
        url: &str,
        max_pages: u32,
        token: &CancellationToken,
    ) -> Vec<ListingRecord> {
        let mut all_listings = Vec::new();

        for page in 1..=max_pages {
            if token.is_cancelled() {
                warn!("Scrape cancelled before page {}", page);
                break;
            }

            let page_url = build_page_url(url, page);
            info!("Scraping page {}", page);

            let body = match self.http.fetch_page_with_cancellation(&page_url, token).await {
                Ok(body) => body,
                Err(e) => {
                    error!("Error fetching page {}: {}", page, e);
                    break;
                }
            };

            // Parse synchronously in its own scope: Html is not Send and
            // must not live across an await point
            let listings = {
                let html = Html::parse_document(&body);
                self.parser.parse_listings(&html)
            };

            if listings.is_empty() {
                info!("No listings found on page {}, stopping", page);
                break;
            }

            info!("Found {} listings on page {}", listings.len(), page);
            all_listings.extend(listings);

            // Politeness delay before the next page
            if page < max_pages && !self.delay.is_zero() {
                tokio::select! {
                    () = sleep(self.delay) => {}
                    () = token.cancelled() => {
                        warn!("Scrape cancelled during politeness delay");
                        break;
                    }
                }
            }
        }

        info!("Total listings scraped: {}", all_listings.len());
        all_listings
    }
}

/// Build the URL for one results page.
///
/// Page 1 is the base URL untouched; later pages get the marketplace's
/// `_pgn` pagination parameter appended with the right separator.
pub fn build_page_url(base_url: &str, page: u32) -> String {
    if page == 1 {
        return base_url.to_string();
    }

    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}_pgn={page}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_one_url_is_unmodified() {
        assert_eq!(
            build_page_url("https://www.ebay.com/sch/i.html?_nkw=iphone", 1),
            "https://www.ebay.com/sch/i.html?_nkw=iphone"
        );
    }

    #[test]
    fn pagination_parameter_respects_existing_query() {
        assert_eq!(
            build_page_url("https://www.ebay.com/sch/i.html?_nkw=iphone", 3),
            "https://www.ebay.com/sch/i.html?_nkw=iphone&_pgn=3"
        );
        assert_eq!(
            build_page_url("https://www.ebay.com/sch/iphone", 2),
            "https://www.ebay.com/sch/iphone?_pgn=2"
        );
    }

    #[tokio::test]
    async fn cancelled_scrape_returns_empty_without_fetching() {
        let scraper = SoldListingsScraper::new(
            HttpClient::new(HttpClientConfig::default()).unwrap(),
            ListingParser::new().unwrap(),
            Duration::from_millis(1),
        );
        let token = CancellationToken::new();
        token.cancel();

        let listings = scraper
            .scrape_with_cancellation("https://www.ebay.com/sch/i.html", 3, &token)
            .await;
        assert!(listings.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_yields_partial_aggregate_not_error() {
        // Nothing listens on this port; the fetch fails immediately and
        // the scrape returns the (empty) aggregate instead of erroring
        let scraper = SoldListingsScraper::new(
            HttpClient::new(HttpClientConfig::default()).unwrap(),
            ListingParser::new().unwrap(),
            Duration::ZERO,
        );

        let listings = scraper.scrape("http://127.0.0.1:9/unreachable", 2).await;
        assert!(listings.is_empty());
    }
}
