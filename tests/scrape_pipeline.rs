//! End-to-end pipeline tests over fixture HTML.
//!
//! Exercises extraction and analysis together the way the orchestrator
//! wires them, without touching the network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scraper::Html;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use soldscope::application::analyzer::{analyze, AnalysisError, OutlierPolicy};
use soldscope::application::scraper::{build_page_url, SoldListingsScraper};
use soldscope::infrastructure::http_client::{HttpClient, HttpClientConfig};
use soldscope::infrastructure::parsing::ListingParser;

const RESULTS_PAGE: &str = r#"
<html><body><ul class="srp-results">
  <li class="s-item">
    <div class="s-item__title">Shop on eBay</div>
    <span class="s-item__price">$20.00</span>
  </li>
  <li class="s-item">
    <div class="s-item__title">iPhone 13 Pro 128GB</div>
    <span class="s-item__price">$450.00</span>
    <div class="s-item__subtitle">Pre-Owned</div>
    <span class="s-item__shipping">Free shipping</span>
    <a class="s-item__link" href="https://www.ebay.com/itm/1"></a>
  </li>
  <li class="s-item">
    <div class="s-item__title">iPhone 13 Pro 256GB</div>
    <span class="s-item__price">$500.00 to $550.00</span>
    <a class="s-item__link" href="https://www.ebay.com/itm/2"></a>
  </li>
  <li class="s-item">
    <div class="s-item__title">iPhone 13 case lot</div>
    <span class="s-item__price">$5.99</span>
  </li>
  <li class="s-item">
    <div class="s-item__title">iPhone 13 Pro for parts</div>
  </li>
  <li class="s-item">
    <div class="s-item__title">iPhone 13 Pro 512GB</div>
    <span class="s-item__price">$610.00</span>
  </li>
</ul></body></html>
"#;

#[test]
fn fixture_page_through_extraction_and_analysis() {
    let parser = ListingParser::new().unwrap();
    let html = Html::parse_document(RESULTS_PAGE);
    let listings = parser.parse_listings(&html);

    // Promo placeholder, out-of-band price, and priceless item all drop
    assert_eq!(listings.len(), 3);
    assert_eq!(listings[0].title, "iPhone 13 Pro 128GB");
    assert_eq!(listings[0].price, Some(450.0));
    assert_eq!(listings[0].condition, "Pre-Owned");
    assert_eq!(listings[0].shipping, "Free shipping");
    assert_eq!(listings[1].price, Some(500.0));
    assert_eq!(listings[1].condition, "Unknown");
    assert_eq!(listings[2].link, "");

    let stats = analyze(&listings, OutlierPolicy::default()).unwrap();
    assert_eq!(stats.count, 3);
    assert!((stats.average - 520.0).abs() < 1e-9);
    assert_eq!(stats.median, 500.0);
    assert_eq!(stats.min, 450.0);
    assert_eq!(stats.max, 610.0);
    assert_eq!(stats.range, 160.0);
    assert_eq!(stats.distribution.len(), 5);
}

#[test]
fn page_with_only_promo_tiles_analyzes_to_no_listings() {
    let parser = ListingParser::new().unwrap();
    let html = Html::parse_document(
        r#"<ul><li class="s-item">
             <div class="s-item__title">Shop on eBay</div>
             <span class="s-item__price">$20.00</span>
           </li></ul>"#,
    );
    let listings = parser.parse_listings(&html);
    assert!(listings.is_empty());

    assert_eq!(
        analyze(&listings, OutlierPolicy::default()),
        Err(AnalysisError::NoListingsFound)
    );
}

const NO_RESULTS_PAGE: &str =
    "<html><body><p>No exact matches found.</p></body></html>";

/// Serve the results fixture for page 1 and a no-results page for any
/// paginated URL, counting requests. Returns the base URL to scrape.
async fn serve_fixture_pages(requests: Arc<AtomicUsize>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            requests.fetch_add(1, Ordering::SeqCst);

            let mut buf = [0u8; 2048];
            let n = stream.read(&mut buf).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]);

            let body = if request.contains("_pgn=") {
                NO_RESULTS_PAGE
            } else {
                RESULTS_PAGE
            };
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
        }
    });

    format!("http://{addr}/sch/i.html?_nkw=iphone+13")
}

#[tokio::test]
async fn empty_follow_up_page_stops_pagination() {
    let requests = Arc::new(AtomicUsize::new(0));
    let base = serve_fixture_pages(Arc::clone(&requests)).await;

    let scraper = SoldListingsScraper::new(
        HttpClient::new(HttpClientConfig::default()).unwrap(),
        ListingParser::new().unwrap(),
        Duration::ZERO,
    );
    let listings = scraper.scrape(&base, 5).await;

    // Page 1's records survive; the empty page 2 ends pagination well
    // short of the five-page budget
    assert_eq!(listings.len(), 3);
    assert_eq!(listings[0].title, "iPhone 13 Pro 128GB");
    assert_eq!(listings[2].title, "iPhone 13 Pro 512GB");
    assert_eq!(requests.load(Ordering::SeqCst), 2);
}

#[test]
fn pagination_urls_cover_a_whole_budget() {
    let base = "https://www.ebay.com/sch/i.html?_nkw=iphone+13&LH_Sold=1";
    let urls: Vec<String> = (1..=3).map(|page| build_page_url(base, page)).collect();

    assert_eq!(urls[0], base);
    assert_eq!(urls[1], format!("{base}&_pgn=2"));
    assert_eq!(urls[2], format!("{base}&_pgn=3"));
}
