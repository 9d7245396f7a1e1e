//! Product filters.
//!
//! Price, stock and potency predicates are independent and combined with
//! AND, so evaluation order never changes the result and filtering an
//! already filtered list is a no-op.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// Lowest selectable potency, in percent.
pub const MIN_POTENCY: f64 = 0.0;
/// Highest selectable potency, in percent.
pub const MAX_POTENCY: f64 = 50.0;

/// Message shown when the filters exclude every product.
pub const EMPTY_RESULTS_MESSAGE: &str =
    "No products match your current filters. Try widening your search or selecting another category.";

/// Filter panel state for one catalog page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Inclusive lower price bound.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
    /// Hide products with nothing in stock.
    pub only_in_stock: bool,
    /// Whether the potency range applies.
    pub potency_enabled: bool,
    /// Inclusive lower potency bound.
    pub min_potency: f64,
    /// Inclusive upper potency bound.
    pub max_potency: f64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            min_price: None,
            max_price: None,
            only_in_stock: false,
            potency_enabled: false,
            min_potency: MIN_POTENCY,
            max_potency: MAX_POTENCY,
        }
    }
}

impl FilterState {
    /// Create a filter state that passes everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the price range.
    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Hide out-of-stock products.
    pub fn with_only_in_stock(mut self, only_in_stock: bool) -> Self {
        self.only_in_stock = only_in_stock;
        self
    }

    /// Enable the potency range.
    pub fn with_potency_range(mut self, min: f64, max: f64) -> Self {
        self.potency_enabled = true;
        self.set_max_potency(max);
        self.set_min_potency(min);
        self
    }

    /// Set the min price from a text input; blank or unparsable clears it.
    pub fn set_min_price_input(&mut self, input: &str) {
        self.min_price = parse_price_input(input);
    }

    /// Set the max price from a text input; blank or unparsable clears it.
    pub fn set_max_price_input(&mut self, input: &str) {
        self.max_price = parse_price_input(input);
    }

    /// Move the lower potency handle; pushes the upper one up if needed.
    pub fn set_min_potency(&mut self, value: f64) {
        let value = clamp_potency(value);
        self.min_potency = value;
        if self.max_potency < value {
            self.max_potency = value;
        }
    }

    /// Move the upper potency handle; pushes the lower one down if needed.
    pub fn set_max_potency(&mut self, value: f64) {
        let value = clamp_potency(value);
        self.max_potency = value;
        if self.min_potency > value {
            self.min_potency = value;
        }
    }

    /// Whether any predicate can exclude a product.
    pub fn is_active(&self) -> bool {
        self.min_price.is_some()
            || self.max_price.is_some()
            || self.only_in_stock
            || self.potency_enabled
    }

    /// Restore the pass-everything defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether a product passes every predicate.
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_price(product) && self.matches_stock(product) && self.matches_potency(product)
    }

    /// Some size must be priced within the range (bounds inclusive).
    pub fn matches_price(&self, product: &Product) -> bool {
        if self.min_price.is_none() && self.max_price.is_none() {
            return true;
        }
        product.prices.values().any(|&price| {
            self.min_price.map_or(true, |min| price >= min)
                && self.max_price.map_or(true, |max| price <= max)
        })
    }

    /// Something must be in stock when `only_in_stock` is set.
    pub fn matches_stock(&self, product: &Product) -> bool {
        if !self.only_in_stock {
            return true;
        }
        product
            .availability
            .as_ref()
            .map(|a| a.any_in_stock())
            .unwrap_or(true)
    }

    /// Potency must be known and in range when the potency filter is on.
    pub fn matches_potency(&self, product: &Product) -> bool {
        if !self.potency_enabled {
            return true;
        }
        product
            .thca_percentage
            .map_or(false, |p| p >= self.min_potency && p <= self.max_potency)
    }
}

/// Parse a price text box. Empty means unset.
pub fn parse_price_input(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn clamp_potency(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_POTENCY;
    }
    value.clamp(MIN_POTENCY, MAX_POTENCY)
}

/// Products passing every predicate, in their original order.
pub fn filter_products(products: &[Product], filters: &FilterState) -> Vec<Product> {
    products
        .iter()
        .filter(|p| filters.matches(p))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Availability;
    use std::collections::BTreeMap;

    fn flower() -> Vec<Product> {
        vec![
            Product::new("Budget", "Flower").with_size("3.5g", 15.0).with_potency(15.0),
            Product::new("Premium", "Flower").with_size("3.5g", 60.0).with_potency(28.0),
            Product::new("Unavailable", "Flower")
                .with_size("3.5g", 20.0)
                .with_potency(22.0)
                .with_availability(Availability::All(false)),
        ]
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_default_passes_everything() {
        let products = flower();
        assert!(!FilterState::new().is_active());
        assert_eq!(filter_products(&products, &FilterState::new()), products);
    }

    #[test]
    fn test_min_price() {
        let filters = FilterState::new().with_price_range(Some(30.0), None);
        assert_eq!(names(&filter_products(&flower(), &filters)), vec!["Premium"]);
    }

    #[test]
    fn test_price_is_existential_across_sizes() {
        let product = Product::new("Multi", "Flower")
            .with_size("3.5g", 20.0)
            .with_size("28g", 120.0);

        let filters = FilterState::new().with_price_range(Some(100.0), Some(150.0));
        assert!(filters.matches_price(&product));

        let filters = FilterState::new().with_price_range(Some(30.0), Some(100.0));
        assert!(!filters.matches_price(&product));

        let filters = FilterState::new().with_price_range(None, Some(20.0));
        assert!(filters.matches_price(&product));
    }

    #[test]
    fn test_only_in_stock() {
        let filters = FilterState::new().with_only_in_stock(true);
        assert_eq!(
            names(&filter_products(&flower(), &filters)),
            vec!["Budget", "Premium"]
        );
    }

    #[test]
    fn test_stock_per_size_map() {
        let filters = FilterState::new().with_only_in_stock(true);

        let mut sizes = BTreeMap::new();
        sizes.insert("3.5g".to_string(), false);
        sizes.insert("7g".to_string(), true);
        let partly = Product::new("Partly", "Flower").with_availability(Availability::BySize(sizes));
        assert!(filters.matches_stock(&partly));

        let mut sizes = BTreeMap::new();
        sizes.insert("3.5g".to_string(), false);
        let sold_out = Product::new("Sold", "Flower").with_availability(Availability::BySize(sizes));
        assert!(!filters.matches_stock(&sold_out));

        let empty = Product::new("Empty", "Flower")
            .with_availability(Availability::BySize(BTreeMap::new()));
        assert!(filters.matches_stock(&empty));
    }

    #[test]
    fn test_potency_range() {
        let filters = FilterState::new().with_potency_range(26.0, 30.0);
        let products = &flower()[..2];
        assert_eq!(names(&filter_products(products, &filters)), vec!["Premium"]);
    }

    #[test]
    fn test_potency_disabled_ignores_values() {
        let mut filters = FilterState::new();
        filters.set_min_potency(40.0);
        let unknown = Product::new("Unknown", "Edibles").with_size("10ct", 25.0);
        assert!(filters.matches(&unknown));

        filters.potency_enabled = true;
        assert!(!filters.matches(&unknown));
    }

    #[test]
    fn test_potency_handles_stay_ordered() {
        let mut filters = FilterState::new();
        filters.set_max_potency(20.0);
        filters.set_min_potency(35.0);
        assert_eq!((filters.min_potency, filters.max_potency), (35.0, 35.0));

        filters.set_max_potency(10.0);
        assert_eq!((filters.min_potency, filters.max_potency), (10.0, 10.0));

        filters.set_max_potency(80.0);
        filters.set_min_potency(-5.0);
        assert_eq!((filters.min_potency, filters.max_potency), (0.0, 50.0));
    }

    #[test]
    fn test_price_inputs() {
        let mut filters = FilterState::new();
        filters.set_min_price_input("12.50");
        filters.set_max_price_input("");
        assert_eq!(filters.min_price, Some(12.5));
        assert_eq!(filters.max_price, None);

        filters.set_min_price_input("  ");
        assert!(!filters.is_active());
        assert_eq!(parse_price_input("abc"), None);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let filters = FilterState::new()
            .with_price_range(Some(10.0), Some(50.0))
            .with_only_in_stock(true)
            .with_potency_range(10.0, 30.0);
        let once = filter_products(&flower(), &filters);
        let twice = filter_products(&once, &filters);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_state_serde_camel_case() {
        let json = serde_json::to_value(FilterState::new().with_only_in_stock(true)).unwrap();
        assert_eq!(json["onlyInStock"], true);
        assert_eq!(json["maxPotency"], 50.0);
    }
}
