//! Application layer module
//!
//! Use-case services that orchestrate the fetch/extract pipeline and the
//! statistical analysis of the scraped price series.

pub mod analyzer;
pub mod scraper;

pub use analyzer::{AnalysisError, OutlierPolicy, PriceAnalyzer};
pub use scraper::SoldListingsScraper;
