//! HTML parsing infrastructure for sold-listings pages
//!
//! Selector-fallback extraction of listing records plus the price text
//! sanitizer, with per-item error containment so one malformed listing
//! never aborts a page.

pub mod listing_parser;
pub mod price;
pub mod selectors;

// Re-export public types
pub use listing_parser::{ExtractionError, ListingParser};
pub use price::{parse_price, PriceBand};
pub use selectors::ListingSelectors;
