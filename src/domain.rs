//! Domain module - core entities and value objects
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod listing;

pub use listing::{ListingRecord, PriceBucket, PriceStatistics};
