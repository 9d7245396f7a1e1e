//! Storefront domain logic for the Route 66 hemp shop.
//!
//! This crate holds everything the storefront decides on its own, behind
//! small ports for cookies, storage and events:
//!
//! - **Catalog**: Product validation, category grouping, sort orders
//! - **Search**: Filters, the lazily loaded search index, the search dialog
//! - **Cart**: Cart with line items and a persisted store
//! - **Consent**: Age gate, cookie consent, analytics gating
//! - **Checkout**: Checkout stub, transaction log, webhook signatures
//!
//! # Example
//!
//! ```rust
//! use route66_commerce::prelude::*;
//!
//! let products = parse_catalog(r#"[
//!     {"name": "Budget", "category": "Flower", "size_options": ["3.5g"], "prices": {"3.5g": 15}},
//!     {"name": "Premium", "category": "Flower", "size_options": ["3.5g"], "prices": {"3.5g": 60}}
//! ]"#).unwrap();
//!
//! let query = CatalogQuery::new()
//!     .with_category("Flower")
//!     .with_filters(FilterState::new().with_price_range(Some(30.0), None));
//! let page = build_page(&products, &query);
//! assert_eq!(page.products[0].name, "Premium");
//! ```

pub mod error;
pub mod events;
pub mod focus;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod consent;
pub mod search;

pub use error::{CatalogError, CommerceError};
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CatalogError, CommerceError};
    pub use crate::events::{EventBus, LocalEventBus, SelectCategory, StoreEvent};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        build_page, group_by_category, load_catalog, min_price, normalize_products,
        parse_catalog, sort_by_order, Availability, Banner, CatalogPage, CatalogQuery,
        CategoryGroup, Product, SortOrder,
    };

    // Search
    pub use crate::search::{
        filter_products, search_products, FilterState, SearchDialog, SearchIndex,
        EMPTY_RESULTS_MESSAGE,
    };

    // Cart
    pub use crate::cart::{Cart, CartItem, CartStore};

    // Consent
    pub use crate::consent::{
        AnalyticsGate, ConsentChoice, ConsentGate, ConsentMode, GateState, GateStep,
    };

    // Checkout
    pub use crate::checkout::{
        process_checkout, verify_webhook_signature, CheckoutOutcome, OrderConfirmation,
        TransactionLog,
    };
}
