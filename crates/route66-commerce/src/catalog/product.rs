//! Product types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{ProductId, VariantId};

/// Merchandising banner shown on a product card.
///
/// Only "New" and "Out of Stock" affect ordering; any other tag is kept
/// verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Banner {
    /// New arrival, listed first.
    New,
    /// Sold out, listed last.
    OutOfStock,
    /// Any other tag (e.g. "Staff Pick").
    Other(String),
}

impl Banner {
    pub fn as_str(&self) -> &str {
        match self {
            Banner::New => "New",
            Banner::OutOfStock => "Out of Stock",
            Banner::Other(tag) => tag,
        }
    }

    /// Tier used by the featured order: New=0, other=1, Out of Stock=2.
    pub fn featured_rank(&self) -> u8 {
        match self {
            Banner::New => 0,
            Banner::Other(_) => 1,
            Banner::OutOfStock => 2,
        }
    }
}

impl From<String> for Banner {
    fn from(s: String) -> Self {
        match s.as_str() {
            "New" => Banner::New,
            "Out of Stock" => Banner::OutOfStock,
            _ => Banner::Other(s),
        }
    }
}

impl From<&str> for Banner {
    fn from(s: &str) -> Self {
        Banner::from(s.to_string())
    }
}

impl From<Banner> for String {
    fn from(b: Banner) -> Self {
        match b {
            Banner::Other(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stock information for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Availability {
    /// One flag for the whole product.
    All(bool),
    /// Flag per size label. Keys are not checked against `size_options`.
    BySize(BTreeMap<String, bool>),
}

impl Availability {
    /// Whether anything is purchasable. An empty per-size map counts as in stock.
    pub fn any_in_stock(&self) -> bool {
        match self {
            Availability::All(available) => *available,
            Availability::BySize(sizes) => sizes.is_empty() || sizes.values().any(|v| *v),
        }
    }

    /// Whether one size is purchasable. Sizes missing from the map are available.
    pub fn size_in_stock(&self, size: &str) -> bool {
        match self {
            Availability::All(available) => *available,
            Availability::BySize(sizes) => sizes.get(size).copied().unwrap_or(true),
        }
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Display name (unique).
    pub name: String,
    /// Category name.
    pub category: String,
    /// Size labels in display order.
    pub size_options: Vec<String>,
    /// Price per size label.
    pub prices: BTreeMap<String, f64>,
    /// THCa potency in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thca_percentage: Option<f64>,
    /// Merchandising banner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<Banner>,
    /// Stock flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
}

impl Product {
    /// Create a product with no sizes yet.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            size_options: Vec::new(),
            prices: BTreeMap::new(),
            thca_percentage: None,
            banner: None,
            availability: None,
        }
    }

    /// Add a size option with its price.
    pub fn with_size(mut self, label: impl Into<String>, price: f64) -> Self {
        let label = label.into();
        if !self.size_options.contains(&label) {
            self.size_options.push(label.clone());
        }
        self.prices.insert(label, price);
        self
    }

    /// Set the THCa potency.
    pub fn with_potency(mut self, percent: f64) -> Self {
        self.thca_percentage = Some(percent);
        self
    }

    /// Set the banner.
    pub fn with_banner(mut self, banner: impl Into<Banner>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    /// Set the availability.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = Some(availability);
        self
    }

    /// Stable id derived from the name.
    pub fn id(&self) -> ProductId {
        ProductId::from_name(&self.name)
    }

    /// Variant id for one size of this product.
    pub fn variant_id(&self, size: &str) -> VariantId {
        VariantId::for_size(&self.name, size)
    }

    /// Price for a size label.
    pub fn price_for(&self, size: &str) -> Option<f64> {
        self.prices.get(size).copied()
    }

    /// Sizes in display order paired with their prices; sizes without a
    /// price are skipped.
    pub fn sized_prices(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.size_options
            .iter()
            .filter_map(|size| self.price_for(size).map(|p| (size.as_str(), p)))
    }

    /// Whether a size can be added to the cart.
    pub fn is_size_available(&self, size: &str) -> bool {
        self.availability
            .as_ref()
            .map(|a| a.size_in_stock(size))
            .unwrap_or(true)
    }

    /// Featured tier of this product's banner (1 when there is none).
    pub fn featured_rank(&self) -> u8 {
        self.banner.as_ref().map(Banner::featured_rank).unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_parsing() {
        assert_eq!(Banner::from("New"), Banner::New);
        assert_eq!(Banner::from("Out of Stock"), Banner::OutOfStock);
        assert_eq!(Banner::from("Staff Pick"), Banner::Other("Staff Pick".into()));
        assert_eq!(Banner::from("new"), Banner::Other("new".into()));
    }

    #[test]
    fn test_banner_serde() {
        let json = serde_json::to_string(&Banner::OutOfStock).unwrap();
        assert_eq!(json, "\"Out of Stock\"");
        let back: Banner = serde_json::from_str("\"New\"").unwrap();
        assert_eq!(back, Banner::New);
    }

    #[test]
    fn test_availability_any_in_stock() {
        assert!(!Availability::All(false).any_in_stock());
        assert!(Availability::BySize(BTreeMap::new()).any_in_stock());

        let mut sizes = BTreeMap::new();
        sizes.insert("3.5g".to_string(), false);
        sizes.insert("7g".to_string(), true);
        let availability = Availability::BySize(sizes);
        assert!(availability.any_in_stock());
        assert!(!availability.size_in_stock("3.5g"));
        assert!(availability.size_in_stock("28g"));
    }

    #[test]
    fn test_product_builder() {
        let product = Product::new("Blue Dream", "Flower")
            .with_size("3.5g", 30.0)
            .with_size("7g", 55.0)
            .with_potency(24.5);

        assert_eq!(product.size_options, vec!["3.5g", "7g"]);
        assert_eq!(product.price_for("7g"), Some(55.0));
        assert_eq!(product.variant_id("3.5g").as_str(), "blue-dream-3-5g");
        assert_eq!(product.id().as_str(), "blue-dream");
        assert_eq!(
            product.sized_prices().collect::<Vec<_>>(),
            vec![("3.5g", 30.0), ("7g", 55.0)]
        );
    }

    #[test]
    fn test_product_serializes_without_absent_fields() {
        let product = Product::new("Gummies", "Edibles").with_size("10ct", 25.0);
        let json = serde_json::to_value(&product).unwrap();
        assert!(json.get("banner").is_none());
        assert!(json.get("thca_percentage").is_none());
    }
}
