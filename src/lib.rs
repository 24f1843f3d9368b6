//! soldscope - eBay sold-listings price scraper and analyzer
//!
//! Scrapes paginated sold-listings search results, extracts structured
//! listing records from the markup, and computes descriptive price
//! statistics for presentation over HTTP or a CLI batch run.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod server;
