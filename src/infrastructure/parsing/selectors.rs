//! CSS selector configuration for listing extraction
//!
//! Each field is an ordered fallback chain: selectors are tried in
//! sequence and the first one that matches wins. The defaults cover the
//! marketplace markup variants observed in the wild; overriding them in
//! the config file is how the scraper survives markup drift without a
//! rebuild.

use serde::{Deserialize, Serialize};

/// CSS selectors for sold-listings result pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// Selectors for listing containers - multiple fallbacks
    pub container: Vec<String>,

    /// Selectors for the listing title
    pub title: Vec<String>,

    /// Selectors for the price text
    pub price: Vec<String>,

    /// Selectors for the item condition
    pub condition: Vec<String>,

    /// Selectors for the shipping cost text
    pub shipping: Vec<String>,

    /// Selectors for the item detail link
    pub link: Vec<String>,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            container: vec![
                ".s-item".to_string(),
                ".srp-results .s-item".to_string(),
                "[data-view=\"mi:1686|iid:1\"]".to_string(),
            ],
            title: vec![".s-item__title".to_string(), ".it-ttl".to_string()],
            price: vec![".s-item__price".to_string(), ".notranslate".to_string()],
            condition: vec![
                ".s-item__subtitle".to_string(),
                ".s-item__condition".to_string(),
            ],
            shipping: vec![
                ".s-item__shipping".to_string(),
                ".s-item__logisticsCost".to_string(),
            ],
            link: vec![".s-item__link".to_string(), ".it-ttl a".to_string()],
        }
    }
}
