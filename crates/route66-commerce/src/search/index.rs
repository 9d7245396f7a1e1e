//! Client-side product search.

use crate::catalog::Product;
use crate::error::CommerceError;

/// Queries shorter than this return nothing.
pub const MIN_QUERY_LEN: usize = 2;
/// Results are capped at this many.
pub const MAX_RESULTS: usize = 8;

/// Shown with a retry button when the product list could not be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "We couldn't load products. Please try again.";

/// Where the lazy product fetch stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Fetching,
    /// Products are loaded.
    Ready,
    /// The fetch failed; only an explicit retry starts another.
    Failed(String),
}

/// Products fetched once per session and searched in memory.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    state: LoadState,
    products: Vec<Product>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// An index that is already loaded.
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            state: LoadState::Ready,
            products,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Claim the fetch. Returns `true` only when the caller should start
    /// one; repeated opens while loading, loaded or failed get `false`.
    pub fn begin_fetch(&mut self) -> bool {
        if self.state != LoadState::Idle {
            return false;
        }
        self.state = LoadState::Fetching;
        true
    }

    /// Record the fetch result. Ignored unless a fetch is in flight.
    pub fn complete_fetch(&mut self, result: Result<Vec<Product>, CommerceError>) {
        if self.state != LoadState::Fetching {
            tracing::debug!(state = ?self.state, "ignoring stale search fetch result");
            return;
        }
        match result {
            Ok(products) => {
                tracing::debug!(count = products.len(), "search index loaded");
                self.products = products;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                tracing::warn!(error = %e, "search index fetch failed");
                self.state = LoadState::Failed(e.to_string());
            }
        }
    }

    /// Fetch synchronously with `fetch` if no fetch has been claimed yet.
    pub fn load_with<F>(&mut self, fetch: F) -> &LoadState
    where
        F: FnOnce() -> Result<Vec<Product>, CommerceError>,
    {
        if self.begin_fetch() {
            self.complete_fetch(fetch());
        }
        &self.state
    }

    /// The "try again" action: re-arm a failed index. Returns whether it
    /// was re-armed.
    pub fn retry(&mut self) -> bool {
        if matches!(self.state, LoadState::Failed(_)) {
            self.state = LoadState::Idle;
            true
        } else {
            false
        }
    }

    /// User-facing error text when the load failed.
    pub fn error_message(&self) -> Option<&'static str> {
        match self.state {
            LoadState::Failed(_) => Some(LOAD_FAILED_MESSAGE),
            _ => None,
        }
    }

    /// Search the loaded products; nothing matches before they are loaded.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        if !self.is_ready() {
            return Vec::new();
        }
        search_products(&self.products, query)
    }
}

/// Case-insensitive substring match over name, category and size labels.
///
/// The query is trimmed first; shorter than [`MIN_QUERY_LEN`] characters
/// yields nothing. At most [`MAX_RESULTS`] hits, in list order.
pub fn search_products<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    if needle.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    products
        .iter()
        .filter(|p| matches_query(p, &needle))
        .take(MAX_RESULTS)
        .collect()
}

fn matches_query(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.category.to_lowercase().contains(needle)
        || product
            .size_options
            .iter()
            .any(|size| size.to_lowercase().contains(needle))
}
