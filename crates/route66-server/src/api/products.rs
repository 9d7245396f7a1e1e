use axum::{
    extract::{Query, State},
    Extension, Json,
};
use route66_commerce::catalog::{build_page, CatalogPage, CatalogQuery, Product, SortOrder};
use route66_commerce::search::{
    parse_price_input, search_products, FilterState, MAX_POTENCY, MIN_POTENCY, MIN_QUERY_LEN,
};
use route66_observability::RequestId;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResponse};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProductsQuery {
    pub category: Option<String>,
    pub sort: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub in_stock: Option<bool>,
    pub min_potency: Option<f64>,
    pub max_potency: Option<f64>,
}

impl ProductsQuery {
    fn to_catalog_query(&self) -> Result<CatalogQuery, String> {
        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") => SortOrder::default(),
            Some(raw) => raw.parse::<SortOrder>().map_err(|e| e.to_string())?,
        };

        let mut filters = FilterState::new()
            .with_price_range(
                self.min_price.as_deref().and_then(parse_price_input),
                self.max_price.as_deref().and_then(parse_price_input),
            )
            .with_only_in_stock(self.in_stock.unwrap_or(false));
        if self.min_potency.is_some() || self.max_potency.is_some() {
            filters = filters.with_potency_range(
                self.min_potency.unwrap_or(MIN_POTENCY),
                self.max_potency.unwrap_or(MAX_POTENCY),
            );
        }

        let mut query = CatalogQuery::new().with_filters(filters).with_sort(sort);
        query.category = self.category.clone().filter(|c| !c.trim().is_empty());
        Ok(query)
    }
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ProductsQuery>,
) -> Result<Json<ApiResponse<CatalogPage>>, ApiError> {
    let query = params
        .to_catalog_query()
        .map_err(|message| ApiError::bad_request(&req_id, message))?;

    let page = build_page(&state.catalog, &query);
    tracing::debug!(
        category = query.category.as_deref().unwrap_or("*"),
        sort = %query.sort,
        count = page.products.len(),
        "catalog page built"
    );
    Ok(Json(ApiResponse::new(page, &req_id)))
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchData {
    query: String,
    min_query_len: usize,
    results: Vec<Product>,
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> Json<ApiResponse<SearchData>> {
    let results = search_products(&state.catalog, &params.q)
        .into_iter()
        .cloned()
        .collect();
    Json(ApiResponse::new(
        SearchData {
            query: params.q,
            min_query_len: MIN_QUERY_LEN,
            results,
        },
        &req_id,
    ))
}
