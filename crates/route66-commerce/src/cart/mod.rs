//! Shopping cart module.
//!
//! Contains the cart and line item types, and the persisted store that
//! applies `cart:*` events.

mod cart;
mod store;

pub use cart::{Cart, CartItem};
pub use store::{item_from_event, CartStore, CART_STORAGE_KEY};
