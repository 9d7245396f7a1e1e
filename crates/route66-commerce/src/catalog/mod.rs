//! Product catalog module.
//!
//! Contains the product type, the normalizer that validates raw product
//! data, category grouping and sort orders, and page assembly.

mod normalize;
mod product;
mod sort;
mod view;

pub use normalize::{load_catalog, normalize_products, parse_catalog};
pub use product::{Availability, Banner, Product};
pub use sort::{
    category_name, category_slug, featured_cmp, group_by_category, min_price, order_cmp,
    sort_by_order, CategoryGroup, SortOrder, UNCATEGORIZED,
};
pub use view::{build_page, CatalogPage, CatalogQuery};
