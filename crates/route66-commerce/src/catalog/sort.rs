//! Category grouping and catalog ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::slugify;

/// Bucket name for products with a blank category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Catalog sort options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOrder {
    /// New arrivals, then regular stock, then sold out; alphabetical within each tier.
    #[default]
    #[serde(rename = "featured")]
    Featured,
    /// Lowest price first.
    #[serde(rename = "price-asc")]
    PriceAsc,
    /// Highest price first.
    #[serde(rename = "price-desc")]
    PriceDesc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Featured => "featured",
            SortOrder::PriceAsc => "price-asc",
            SortOrder::PriceDesc => "price-desc",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOrder::Featured => "Featured",
            SortOrder::PriceAsc => "Price: Low to High",
            SortOrder::PriceDesc => "Price: High to Low",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(SortOrder::Featured),
            "price-asc" => Ok(SortOrder::PriceAsc),
            "price-desc" => Ok(SortOrder::PriceDesc),
            other => Err(CommerceError::UnknownSortOrder(other.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Products sharing one category, already in featured order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    /// Category name.
    pub name: String,
    /// URL slug of the name.
    pub slug: String,
    /// Products in featured order.
    pub products: Vec<Product>,
}

/// Lowest price across all sizes, or `None` when the product has no prices.
pub fn min_price(product: &Product) -> Option<f64> {
    product.prices.values().copied().min_by(f64::total_cmp)
}

/// Featured comparison: banner tier, then case-sensitive name.
pub fn featured_cmp(a: &Product, b: &Product) -> Ordering {
    a.featured_rank()
        .cmp(&b.featured_rank())
        .then_with(|| a.name.cmp(&b.name))
}

/// Comparison for a sort order.
///
/// Unpriced products sort after priced ones in both price directions.
/// Equal prices fall back to featured order.
pub fn order_cmp(a: &Product, b: &Product, order: SortOrder) -> Ordering {
    let by_price = |desc: bool| match (min_price(a), min_price(b)) {
        (Some(pa), Some(pb)) if desc => pb.total_cmp(&pa),
        (Some(pa), Some(pb)) => pa.total_cmp(&pb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    match order {
        SortOrder::Featured => featured_cmp(a, b),
        SortOrder::PriceAsc => by_price(false).then_with(|| featured_cmp(a, b)),
        SortOrder::PriceDesc => by_price(true).then_with(|| featured_cmp(a, b)),
    }
}

/// Return the products in the given order.
pub fn sort_by_order(products: &[Product], order: SortOrder) -> Vec<Product> {
    let mut sorted = products.to_vec();
    sorted.sort_by(|a, b| order_cmp(a, b, order));
    sorted
}

/// Group products by category in first-seen order, each group in featured order.
pub fn group_by_category(products: &[Product]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for product in products {
        let name = category_name(product);
        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.products.push(product.clone()),
            None => groups.push(CategoryGroup {
                slug: category_slug(name),
                name: name.to_string(),
                products: vec![product.clone()],
            }),
        }
    }

    for group in &mut groups {
        group.products.sort_by(featured_cmp);
    }

    groups
}

/// Category a product is listed under.
pub fn category_name(product: &Product) -> &str {
    let name = product.category.trim();
    if name.is_empty() {
        UNCATEGORIZED
    } else {
        name
    }
}

/// Slug used in category anchors and selection events.
pub fn category_slug(name: &str) -> String {
    slugify(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: f64) -> Product {
        Product::new(name, "Flower").with_size("3.5g", price)
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_min_price() {
        let p = Product::new("A", "Flower")
            .with_size("3.5g", 30.0)
            .with_size("7g", 55.0)
            .with_size("1g", 12.5);
        assert_eq!(min_price(&p), Some(12.5));
        assert_eq!(min_price(&Product::new("Empty", "Flower")), None);
    }

    #[test]
    fn test_featured_order_tiers() {
        let products = vec![
            product("Zkittlez", 20.0),
            product("Apple Fritter", 20.0).with_banner("Out of Stock"),
            product("Mimosa", 20.0).with_banner("New"),
            product("Banana", 20.0).with_banner("Staff Pick"),
            product("Acai", 20.0).with_banner("New"),
        ];

        let sorted = sort_by_order(&products, SortOrder::Featured);
        assert_eq!(
            names(&sorted),
            vec!["Acai", "Mimosa", "Banana", "Zkittlez", "Apple Fritter"]
        );
    }

    #[test]
    fn test_featured_name_compare_is_case_sensitive() {
        let products = vec![product("apple", 1.0), product("Banana", 1.0)];
        let sorted = sort_by_order(&products, SortOrder::Featured);
        assert_eq!(names(&sorted), vec!["Banana", "apple"]);
    }

    #[test]
    fn test_price_orders() {
        let products = vec![product("Mid", 30.0), product("Low", 15.0), product("High", 60.0)];

        let asc = sort_by_order(&products, SortOrder::PriceAsc);
        assert_eq!(names(&asc), vec!["Low", "Mid", "High"]);

        let desc = sort_by_order(&asc, SortOrder::PriceDesc);
        assert_eq!(names(&desc), vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn test_unpriced_sorts_last_both_directions() {
        let products = vec![
            Product::new("Unpriced", "Flower"),
            product("Low", 15.0),
            product("High", 60.0),
        ];

        let asc = sort_by_order(&products, SortOrder::PriceAsc);
        assert_eq!(names(&asc), vec!["Low", "High", "Unpriced"]);

        let desc = sort_by_order(&products, SortOrder::PriceDesc);
        assert_eq!(names(&desc), vec!["High", "Low", "Unpriced"]);
    }

    #[test]
    fn test_price_ties_use_featured_order() {
        let products = vec![
            product("B", 20.0),
            product("A", 20.0).with_banner("Out of Stock"),
            product("C", 20.0).with_banner("New"),
        ];
        let asc = sort_by_order(&products, SortOrder::PriceAsc);
        assert_eq!(names(&asc), vec!["C", "B", "A"]);
        let desc = sort_by_order(&products, SortOrder::PriceDesc);
        assert_eq!(names(&desc), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_sort_is_deterministic() {
        let products = vec![
            product("D", 10.0),
            product("B", 10.0),
            Product::new("X", "Flower"),
            product("A", 5.0).with_banner("New"),
            Product::new("W", "Flower"),
        ];
        let first = sort_by_order(&products, SortOrder::PriceDesc);
        for _ in 0..5 {
            let again = sort_by_order(&first, SortOrder::PriceDesc);
            assert_eq!(names(&again), names(&first));
        }
    }

    #[test]
    fn test_group_by_category() {
        let products = vec![
            Product::new("Pre-Roll B", "Pre-Rolls").with_size("1ct", 8.0),
            product("Zkittlez", 20.0),
            Product::new("Mystery", "  ").with_size("1ct", 1.0),
            product("Acai", 20.0).with_banner("New"),
            Product::new("Pre-Roll A", "Pre-Rolls").with_size("1ct", 8.0),
        ];

        let groups = group_by_category(&products);
        let group_names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(group_names, vec!["Pre-Rolls", "Flower", UNCATEGORIZED]);

        assert_eq!(groups[0].slug, "pre-rolls");
        assert_eq!(names(&groups[0].products), vec!["Pre-Roll A", "Pre-Roll B"]);
        assert_eq!(names(&groups[1].products), vec!["Acai", "Zkittlez"]);
        assert_eq!(names(&groups[2].products), vec!["Mystery"]);
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("price-asc".parse::<SortOrder>().unwrap(), SortOrder::PriceAsc);
        assert_eq!(SortOrder::PriceDesc.to_string(), "price-desc");
        assert!("cheapest".parse::<SortOrder>().is_err());
        assert_eq!(
            serde_json::to_string(&SortOrder::Featured).unwrap(),
            "\"featured\""
        );
    }
}
