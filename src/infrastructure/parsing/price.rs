//! Price text sanitizer
//!
//! Turns free-form marketplace price text into a numeric value, or
//! nothing when the text is garbage or outside the plausible band for
//! the product category.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::infrastructure::config::defaults;

/// First decimal numeric token, e.g. "1234.50" in "1234.50 shipping extra".
static PRICE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.?\d*)").expect("price token pattern is valid"));

/// Plausible price range for the product category.
///
/// Values outside the band are treated as extraction garbage, not real
/// prices. The band is configurable per category via the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub min: f64,
    pub max: f64,
}

impl Default for PriceBand {
    fn default() -> Self {
        Self {
            min: defaults::PRICE_BAND_MIN,
            max: defaults::PRICE_BAND_MAX,
        }
    }
}

impl PriceBand {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Parse a numeric price out of free-form price text.
///
/// Strips currency symbols and thousands separators, takes the lower
/// bound of "X to Y" ranges, and accepts only values within the band.
pub fn parse_price(text: &str, band: &PriceBand) -> Option<f64> {
    if text.is_empty() {
        return None;
    }

    let cleaned = text.replace(['$', ','], "");
    let cleaned = cleaned.trim();

    // Price ranges keep only the lower bound
    let cleaned = match cleaned.split_once(" to ") {
        Some((low, _)) => low.trim(),
        None => cleaned,
    };

    let token = PRICE_TOKEN.captures(cleaned)?.get(1)?.as_str();
    let value: f64 = token.parse().ok()?;

    band.contains(value).then_some(value)
}
