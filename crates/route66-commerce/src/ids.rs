//! Newtype IDs and slug helpers.
//!
//! Cart lines are keyed by a variant id derived from the product name and
//! size label, so the same size of the same product always merges into one
//! line no matter which page added it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(VariantId);

impl ProductId {
    /// Product id for a catalog entry: the slug of its name.
    pub fn from_name(name: &str) -> Self {
        Self(slugify(name))
    }
}

impl VariantId {
    /// Variant id for one size of a product: `slug(name)-slug(size)`.
    pub fn for_size(product_name: &str, size: &str) -> Self {
        Self(format!("{}-{}", slugify(product_name), slugify(size)))
    }
}

/// Lowercase ASCII slug: alphanumerics kept, every other run collapsed to `-`.
///
/// ```
/// use route66_commerce::ids::slugify;
/// assert_eq!(slugify("Blue Dream (3.5g)"), "blue-dream-3-5g");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
