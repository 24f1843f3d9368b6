//! Listing extraction from sold-listings result pages
//!
//! Robust HTML parsing with selector fallback chains and per-item error
//! containment. A page with no matching containers is a normal "no
//! results" signal, not an error; a malformed listing skips only itself.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};

use super::price::{parse_price, PriceBand};
use super::selectors::ListingSelectors;
use crate::domain::ListingRecord;

/// The marketplace pads result pages with this promotional placeholder.
const PROMO_PLACEHOLDER: &str = "shop on ebay";

/// Sentinel for non-price fields the markup did not provide.
const UNKNOWN: &str = "Unknown";

/// Why a single container yielded no listing record.
///
/// These are fully local: the extractor logs them at low severity and
/// moves on to the next container.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("promotional placeholder item")]
    PromotionalItem,

    #[error("no parseable price in '{0}'")]
    UnparseablePrice(String),
}

/// Parser for extracting listing records from result-page markup.
pub struct ListingParser {
    container_selectors: Vec<Selector>,
    title_selectors: Vec<Selector>,
    price_selectors: Vec<Selector>,
    condition_selectors: Vec<Selector>,
    shipping_selectors: Vec<Selector>,
    link_selectors: Vec<Selector>,
    price_band: PriceBand,
}

impl ListingParser {
    /// Create a parser with the default selectors and price band.
    pub fn new() -> anyhow::Result<Self> {
        Self::with_selectors(&ListingSelectors::default(), PriceBand::default())
    }

    /// Create a parser with custom selector configuration.
    pub fn with_selectors(
        selectors: &ListingSelectors,
        price_band: PriceBand,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            container_selectors: Self::compile_selectors(&selectors.container)?,
            title_selectors: Self::compile_selectors(&selectors.title)?,
            price_selectors: Self::compile_selectors(&selectors.price)?,
            condition_selectors: Self::compile_selectors(&selectors.condition)?,
            shipping_selectors: Self::compile_selectors(&selectors.shipping)?,
            link_selectors: Self::compile_selectors(&selectors.link)?,
            price_band,
        })
    }

    /// Compile multiple selector strings into Selector objects.
    ///
    /// Individual bad selectors are skipped with a warning; a chain with
    /// no valid selectors at all is a construction error.
    fn compile_selectors(selector_strings: &[String]) -> anyhow::Result<Vec<Selector>> {
        let mut compiled = Vec::new();
        let mut errors = Vec::new();

        for selector_str in selector_strings {
            match Selector::parse(selector_str) {
                Ok(selector) => compiled.push(selector),
                Err(e) => {
                    warn!("Failed to compile selector '{}': {}", selector_str, e);
                    errors.push(format!("'{selector_str}': {e}"));
                }
            }
        }

        if compiled.is_empty() {
            anyhow::bail!("No valid selectors compiled. Errors: {}", errors.join(", "));
        }

        Ok(compiled)
    }

    /// Extract all listing records from one page's markup.
    ///
    /// Tries each container selector in turn; the first one that matches
    /// at least one element wins. No match at all returns an empty vec,
    /// which the orchestrator treats as the end of pagination.
    pub fn parse_listings(&self, html: &Html) -> Vec<ListingRecord> {
        let mut containers: Vec<ElementRef> = Vec::new();
        for selector in &self.container_selectors {
            containers = html.select(selector).collect();
            if !containers.is_empty() {
                break;
            }
        }

        if containers.is_empty() {
            warn!("No listing containers matched any selector");
            return Vec::new();
        }

        let mut listings = Vec::new();
        for (index, container) in containers.iter().enumerate() {
            match self.extract_listing(container) {
                Ok(listing) => listings.push(listing),
                Err(e) => {
                    debug!("Skipping listing at index {}: {}", index, e);
                }
            }
        }

        debug!(
            "Extracted {} listings from {} containers",
            listings.len(),
            containers.len()
        );
        listings
    }

    /// Extract one listing record from a container element.
    ///
    /// A listing without a parseable price is dropped entirely rather
    /// than kept with a null price: precision over recall, since such a
    /// record is useless to the statistics engine.
    fn extract_listing(&self, element: &ElementRef) -> Result<ListingRecord, ExtractionError> {
        let title = self
            .first_text(element, &self.title_selectors)
            .ok_or(ExtractionError::MissingField("title"))?;

        if title.to_lowercase().contains(PROMO_PLACEHOLDER) {
            return Err(ExtractionError::PromotionalItem);
        }

        let price_text = self
            .first_text(element, &self.price_selectors)
            .ok_or(ExtractionError::MissingField("price"))?;
        let price = parse_price(&price_text, &self.price_band)
            .ok_or(ExtractionError::UnparseablePrice(price_text))?;

        let condition = self
            .first_text(element, &self.condition_selectors)
            .unwrap_or_else(|| UNKNOWN.to_string());

        let shipping = self
            .first_text(element, &self.shipping_selectors)
            .unwrap_or_else(|| UNKNOWN.to_string());

        let link = self
            .first_attr(element, &self.link_selectors, "href")
            .unwrap_or_default();

        Ok(ListingRecord {
            title,
            price: Some(price),
            condition,
            shipping,
            link,
        })
    }

    /// Extract text content using multiple selectors as fallbacks.
    fn first_text(&self, element: &ElementRef, selectors: &[Selector]) -> Option<String> {
        selectors.iter().find_map(|selector| {
            element
                .select(selector)
                .next()
                .map(|e| e.text().collect::<String>().trim().to_string())
                .filter(|text| !text.is_empty())
        })
    }

    /// Extract an attribute value using multiple selectors as fallbacks.
    fn first_attr(
        &self,
        element: &ElementRef,
        selectors: &[Selector],
        attr: &str,
    ) -> Option<String> {
        selectors.iter().find_map(|selector| {
            element
                .select(selector)
                .next()
                .and_then(|e| e.value().attr(attr))
                .map(str::to_string)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Vec<ListingRecord> {
        let parser = ListingParser::new().unwrap();
        let document = Html::parse_document(html);
        parser.parse_listings(&document)
    }

    #[test]
    fn extracts_complete_listing() {
        let listings = parse(
            r#"<ul>
                <li class="s-item">
                    <a class="s-item__link" href="https://www.ebay.com/itm/1">
                        <div class="s-item__title">iPhone 13 Pro 128GB</div>
                    </a>
                    <span class="s-item__price">$549.99</span>
                    <span class="s-item__subtitle">Pre-owned</span>
                    <span class="s-item__shipping">Free shipping</span>
                </li>
            </ul>"#,
        );

        assert_eq!(listings.len(), 1);
        let listing = &listings[0];
        assert_eq!(listing.title, "iPhone 13 Pro 128GB");
        assert_eq!(listing.price, Some(549.99));
        assert_eq!(listing.condition, "Pre-owned");
        assert_eq!(listing.shipping, "Free shipping");
        assert_eq!(listing.link, "https://www.ebay.com/itm/1");
    }

    #[test]
    fn missing_fields_fall_back_to_unknown_sentinel() {
        let listings = parse(
            r#"<div class="s-item">
                <div class="s-item__title">iPhone 13 mini</div>
                <span class="s-item__price">$399.00</span>
            </div>"#,
        );

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].condition, "Unknown");
        assert_eq!(listings[0].shipping, "Unknown");
        assert_eq!(listings[0].link, "");
    }

    #[test]
    fn promotional_placeholder_is_rejected_case_insensitively() {
        let listings = parse(
            r#"<div class="s-item">
                <div class="s-item__title">Shop On eBay</div>
                <span class="s-item__price">$20.00</span>
            </div>"#,
        );
        assert!(listings.is_empty());
    }

    #[test]
    fn container_without_parseable_price_yields_no_record() {
        let listings = parse(
            r#"<ul>
                <li class="s-item">
                    <div class="s-item__title">iPhone 12 spares</div>
                    <span class="s-item__price">free</span>
                </li>
                <li class="s-item">
                    <div class="s-item__title">iPhone 12 64GB</div>
                    <span class="s-item__price">$299.95</span>
                </li>
            </ul>"#,
        );

        // No null-price record leaks through; the priced sibling survives
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "iPhone 12 64GB");
    }

    #[test]
    fn falls_back_to_secondary_container_selector() {
        let listings = parse(
            r#"<div data-view="mi:1686|iid:1">
                <div class="it-ttl">iPhone 11 64GB</div>
                <span class="notranslate">$189.50</span>
            </div>"#,
        );

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "iPhone 11 64GB");
        assert_eq!(listings[0].price, Some(189.50));
    }

    #[test]
    fn page_without_containers_is_empty_not_an_error() {
        let listings = parse("<html><body><p>No results matched.</p></body></html>");
        assert!(listings.is_empty());
    }

    #[test]
    fn malformed_item_skips_only_itself() {
        let listings = parse(
            r#"<ul>
                <li class="s-item"></li>
                <li class="s-item">
                    <div class="s-item__title">iPhone SE 2022</div>
                    <span class="s-item__price">$219.00</span>
                </li>
            </ul>"#,
        );

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "iPhone SE 2022");
    }

    #[test]
    fn price_range_listing_records_the_lower_bound() {
        let listings = parse(
            r#"<div class="s-item">
                <div class="s-item__title">iPhone 13 lot</div>
                <span class="s-item__price">$120.00 to $250.00</span>
            </div>"#,
        );

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].price, Some(120.0));
    }
}
