//! Storage ports for the Route 66 storefront.
//!
//! Browser storage (localStorage, cookies) sits behind two small traits so
//! the cart and consent logic can run against real backends or in-memory
//! doubles:
//!
//! - [`KeyValueStore`] with [`MemoryStore`] and the directory-backed [`FileStore`]
//! - [`CookieStore`] with [`MemoryCookieJar`]
//! - [`Cache`], a typed JSON wrapper over any `KeyValueStore`
//!
//! # Example
//!
//! ```rust
//! use route66_storage::{Cache, MemoryStore};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Snapshot {
//!     items: Vec<String>,
//! }
//!
//! let cache = Cache::new(MemoryStore::new());
//! cache.set("cart", &Snapshot { items: vec!["flower-3-5g".into()] }).unwrap();
//!
//! let loaded: Option<Snapshot> = cache.get("cart").unwrap();
//! assert_eq!(loaded.unwrap().items.len(), 1);
//! ```

mod cookie;
mod error;
mod kv;

pub use cookie::{Cookie, CookieStore, MemoryCookieJar, SameSite, DEFAULT_COOKIE_MAX_AGE_SECS};
pub use error::StorageError;
pub use kv::{Cache, FileStore, KeyValueStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Cache, Cookie, CookieStore, FileStore, KeyValueStore, MemoryCookieJar, MemoryStore,
        SameSite, StorageError,
    };
}
