//! Listing entities shared by the scraper and the analyzer

use serde::{Deserialize, Serialize};

/// One scraped sale record from the marketplace's search results.
///
/// A record without a parseable price is excluded from statistical
/// computation but is still a valid member of raw scrape output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    pub price: Option<f64>,
    pub condition: String,
    pub shipping: String,
    pub link: String,
}

impl ListingRecord {
    /// Whether this record carries a price usable for statistics.
    pub fn has_valid_price(&self) -> bool {
        self.price.is_some_and(f64::is_finite)
    }
}

/// One labeled sub-range of the price distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBucket {
    pub label: String,
    pub count: usize,
}

/// Descriptive statistics derived from one batch of listings.
///
/// Created fresh per analysis call; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStatistics {
    pub count: usize,
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub std_dev: f64,
    pub distribution: Vec<PriceBucket>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priceless_record_is_not_valid_for_statistics() {
        let record = ListingRecord {
            title: "iPhone 13 Pro 128GB".to_string(),
            price: None,
            condition: "Unknown".to_string(),
            shipping: "Unknown".to_string(),
            link: String::new(),
        };
        assert!(!record.has_valid_price());
    }

    #[test]
    fn priced_record_is_valid_for_statistics() {
        let record = ListingRecord {
            title: "iPhone 13 Pro 128GB".to_string(),
            price: Some(549.99),
            condition: "Pre-owned".to_string(),
            shipping: "Free shipping".to_string(),
            link: "https://www.ebay.com/itm/1".to_string(),
        };
        assert!(record.has_valid_price());
    }
}
