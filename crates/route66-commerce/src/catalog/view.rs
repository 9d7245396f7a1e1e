//! Catalog page assembly: category selection, filters and sort.

use serde::{Deserialize, Serialize};

use crate::catalog::{
    category_name, category_slug, group_by_category, sort_by_order, CategoryGroup, Product,
    SortOrder,
};
use crate::events::SelectCategory;
use crate::search::{filter_products, FilterState, EMPTY_RESULTS_MESSAGE};

/// What the shopper has selected on a catalog page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    /// Category name or slug; `None` shows every category.
    pub category: Option<String>,
    /// Filter panel state.
    pub filters: FilterState,
    /// Sort order.
    pub sort: SortOrder,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_filters(mut self, filters: FilterState) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Follow a `products:select-category` event. Returns the product to
    /// scroll to, if the event named one.
    pub fn apply_selection(&mut self, selection: &SelectCategory) -> Option<String> {
        if let Some(category) = selection
            .category_slug
            .as_ref()
            .or(selection.category_name.as_ref())
        {
            self.category = Some(category.clone());
        }
        selection.product_id.as_ref().map(|id| id.to_string())
    }

    /// Whether a product is in the selected category.
    pub fn matches_category(&self, product: &Product) -> bool {
        match self.category.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(selected) => category_slug(category_name(product)) == category_slug(selected),
        }
    }
}

/// Products to render for one catalog page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    /// Products after category, filters and sort.
    pub products: Vec<Product>,
    /// Products in the category before filtering.
    pub category_total: usize,
    /// Fallback text when the filters excluded everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl CatalogPage {
    /// Group the page's products by category for the all-categories view.
    pub fn groups(&self) -> Vec<CategoryGroup> {
        group_by_category(&self.products)
    }
}

/// Narrow to the category, filter, then sort.
pub fn build_page(products: &[Product], query: &CatalogQuery) -> CatalogPage {
    let in_category: Vec<Product> = products
        .iter()
        .filter(|p| query.matches_category(p))
        .cloned()
        .collect();

    let filtered = filter_products(&in_category, &query.filters);
    let sorted = sort_by_order(&filtered, query.sort);

    CatalogPage {
        empty_message: sorted.is_empty().then_some(EMPTY_RESULTS_MESSAGE),
        category_total: in_category.len(),
        products: sorted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Availability;
    use crate::ids::ProductId;

    fn products() -> Vec<Product> {
        vec![
            Product::new("Budget", "Flower").with_size("3.5g", 15.0).with_potency(15.0),
            Product::new("Premium", "Flower").with_size("3.5g", 60.0).with_potency(28.0),
            Product::new("Unavailable", "Flower")
                .with_size("3.5g", 20.0)
                .with_potency(22.0)
                .with_availability(Availability::All(false)),
            Product::new("Gummies", "Edibles").with_size("10ct", 25.0).with_potency(5.0),
        ]
    }

    fn names(page: &CatalogPage) -> Vec<&str> {
        page.products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_category_and_min_price() {
        let query = CatalogQuery::new()
            .with_category("Flower")
            .with_filters(FilterState::new().with_price_range(Some(30.0), None));
        let page = build_page(&products(), &query);
        assert_eq!(names(&page), vec!["Premium"]);
        assert_eq!(page.category_total, 3);
        assert_eq!(page.empty_message, None);
    }

    #[test]
    fn test_category_matches_slug_or_name() {
        let by_slug = CatalogQuery::new().with_category("edibles");
        let by_name = CatalogQuery::new().with_category("Edibles");
        assert_eq!(names(&build_page(&products(), &by_slug)), vec!["Gummies"]);
        assert_eq!(names(&build_page(&products(), &by_name)), vec!["Gummies"]);
    }

    #[test]
    fn test_empty_page_message() {
        let query = CatalogQuery::new()
            .with_category("Flower")
            .with_filters(FilterState::new().with_price_range(Some(1000.0), None));
        let page = build_page(&products(), &query);
        assert!(page.products.is_empty());
        assert_eq!(page.empty_message, Some(EMPTY_RESULTS_MESSAGE));
    }

    #[test]
    fn test_sorted_page() {
        let query = CatalogQuery::new().with_sort(SortOrder::PriceDesc);
        let page = build_page(&products(), &query);
        assert_eq!(names(&page), vec!["Premium", "Gummies", "Unavailable", "Budget"]);
        let groups = page.groups();
        assert_eq!(groups[0].name, "Flower");
        assert_eq!(groups[1].name, "Edibles");
    }

    #[test]
    fn test_apply_selection() {
        let mut query = CatalogQuery::new().with_category("Flower");
        let target = query.apply_selection(&SelectCategory {
            category_slug: Some("edibles".to_string()),
            category_name: Some("Edibles".to_string()),
            product_id: Some(ProductId::new("gummies")),
        });
        assert_eq!(query.category.as_deref(), Some("edibles"));
        assert_eq!(target.as_deref(), Some("gummies"));

        assert_eq!(query.apply_selection(&SelectCategory::default()), None);
        assert_eq!(query.category.as_deref(), Some("edibles"));
    }
}
