//! Statistical analysis of scraped price data
//!
//! Extracts the valid price series from a batch of listings, removes
//! Tukey-fence outliers, and computes descriptive statistics with a
//! 5-bucket price distribution.

use statrs::statistics::Statistics;
use thiserror::Error;
use tracing::info;

use crate::domain::{ListingRecord, PriceBucket, PriceStatistics};
use crate::infrastructure::config::OutlierConfig;

const DISTRIBUTION_BUCKETS: usize = 5;

/// Outlier-removal policy for the price series.
#[derive(Debug, Clone, Copy)]
pub struct OutlierPolicy {
    /// Tukey fence multiplier applied to the interquartile range.
    pub fence_multiplier: f64,

    /// Minimum sample size for quartile estimation; smaller series are
    /// used as-is.
    pub min_sample_for_fences: usize,
}

impl Default for OutlierPolicy {
    fn default() -> Self {
        Self {
            fence_multiplier: 1.5,
            min_sample_for_fences: 3,
        }
    }
}

impl From<OutlierConfig> for OutlierPolicy {
    fn from(config: OutlierConfig) -> Self {
        Self {
            fence_multiplier: config.fence_multiplier,
            min_sample_for_fences: config.min_sample_for_fences,
        }
    }
}

/// Why a batch of listings produced no statistics.
///
/// "Nothing was scraped" and "nothing scraped had a usable price" are
/// surfaced distinctly at the caller boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("No listings found")]
    NoListingsFound,

    #[error("No valid price data found")]
    NoValidPriceData,
}

/// Analyzer for price statistics over one batch of listings.
pub struct PriceAnalyzer<'a> {
    listings: &'a [ListingRecord],
    prices: Vec<f64>,
}

impl<'a> PriceAnalyzer<'a> {
    /// Build an analyzer, extracting valid prices and removing outliers.
    pub fn new(listings: &'a [ListingRecord], policy: OutlierPolicy) -> Self {
        let raw: Vec<f64> = listings
            .iter()
            .filter(|listing| listing.has_valid_price())
            .filter_map(|listing| listing.price)
            .collect();

        let prices = remove_outliers(raw, &policy);
        info!(
            "Extracted {} valid prices from {} listings",
            prices.len(),
            listings.len()
        );

        Self { listings, prices }
    }

    /// The sanitized price series after outlier removal.
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Compute comprehensive price statistics.
    ///
    /// `None` means there is no valid price data, whether because the
    /// input was empty or because every price was filtered away.
    pub fn calculate_statistics(&self) -> Option<PriceStatistics> {
        if self.prices.is_empty() {
            return None;
        }

        let count = self.prices.len();
        let min = self.prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // Sample standard deviation is undefined for one observation;
        // report 0 rather than dividing by zero
        let std_dev = if count > 1 {
            self.prices.clone().std_dev()
        } else {
            0.0
        };

        Some(PriceStatistics {
            count,
            average: self.prices.clone().mean(),
            median: median(&self.prices),
            min,
            max,
            range: max - min,
            std_dev,
            distribution: build_distribution(&self.prices, min, max),
        })
    }

    /// Formatted human-readable summary of the analysis.
    pub fn summary_text(&self) -> String {
        let Some(stats) = self.calculate_statistics() else {
            return "No valid price data available for analysis.".to_string();
        };

        let mut summary = format!(
            "\nPrice Analysis Summary\n\
             ======================\n\
             Total Listings: {}\n\
             Average Price: ${:.2}\n\
             Median Price: ${:.2}\n\
             Price Range: ${:.2} - ${:.2}\n\
             Standard Deviation: ${:.2}\n\n\
             Price Distribution:\n",
            stats.count, stats.average, stats.median, stats.min, stats.max, stats.std_dev
        );

        for bucket in &stats.distribution {
            let percentage = (bucket.count as f64 / stats.count as f64) * 100.0;
            summary.push_str(&format!(
                "  {}: {} listings ({:.1}%)\n",
                bucket.label, bucket.count, percentage
            ));
        }

        summary
    }

    /// Listings whose price falls within the given range, inclusive.
    pub fn listings_in_price_range(&self, min: f64, max: f64) -> Vec<&ListingRecord> {
        self.listings
            .iter()
            .filter(|listing| {
                listing
                    .price
                    .is_some_and(|price| price >= min && price <= max)
            })
            .collect()
    }
}

/// Analyze a batch of listings, distinguishing "no listings" from
/// "listings without usable prices" at the caller boundary.
pub fn analyze(
    listings: &[ListingRecord],
    policy: OutlierPolicy,
) -> Result<PriceStatistics, AnalysisError> {
    if listings.is_empty() {
        return Err(AnalysisError::NoListingsFound);
    }

    PriceAnalyzer::new(listings, policy)
        .calculate_statistics()
        .ok_or(AnalysisError::NoValidPriceData)
}

/// Quantile over a sorted series using rounding-index estimation.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * q).round() as usize;
    sorted[idx]
}

/// Remove statistical outliers with Tukey fences.
///
/// Series below the policy's minimum sample size pass through untouched;
/// quartiles over so few points would be noise. Input order is
/// preserved for the survivors.
fn remove_outliers(prices: Vec<f64>, policy: &OutlierPolicy) -> Vec<f64> {
    if prices.len() < policy.min_sample_for_fences {
        return prices;
    }

    let mut sorted = prices.clone();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;

    let lower_bound = q1 - policy.fence_multiplier * iqr;
    let upper_bound = q3 + policy.fence_multiplier * iqr;

    let filtered: Vec<f64> = prices
        .into_iter()
        .filter(|&p| p >= lower_bound && p <= upper_bound)
        .collect();

    let removed = sorted.len() - filtered.len();
    if removed > 0 {
        info!("Removed {} outliers from price data", removed);
    }

    filtered
}

fn median(prices: &[f64]) -> f64 {
    let mut sorted = prices.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Split [min, max] into five equal sub-ranges and count prices per
/// range. Buckets 0-3 are half-open; the last bucket is closed so the
/// maximum value always lands somewhere.
fn build_distribution(prices: &[f64], min: f64, max: f64) -> Vec<PriceBucket> {
    let width = (max - min) / DISTRIBUTION_BUCKETS as f64;

    (0..DISTRIBUTION_BUCKETS)
        .map(|i| {
            let start = min + i as f64 * width;
            let end = min + (i + 1) as f64 * width;

            let count = if i == DISTRIBUTION_BUCKETS - 1 {
                prices.iter().filter(|&&p| p >= start && p <= end).count()
            } else {
                prices.iter().filter(|&&p| p >= start && p < end).count()
            };

            PriceBucket {
                label: format!("${start:.0} - ${end:.0}"),
                count,
            }
        })
        .collect()
}
