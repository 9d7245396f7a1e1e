//! Search module.
//!
//! Contains the product filters, the lazily loaded search index and the
//! keyboard-driven search dialog.

mod dialog;
mod filter;
mod index;

pub use dialog::{
    result_element_id, DialogOutcome, Key, SearchDialog, SEARCH_CLOSE_ID, SEARCH_INPUT_ID,
};
pub use filter::{
    filter_products, parse_price_input, FilterState, EMPTY_RESULTS_MESSAGE, MAX_POTENCY,
    MIN_POTENCY,
};
pub use index::{
    search_products, LoadState, SearchIndex, LOAD_FAILED_MESSAGE, MAX_RESULTS, MIN_QUERY_LEN,
};
