//! Cart and line item types.

use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::ids::{ProductId, VariantId};
use crate::money::{Currency, Money};

/// A line in the cart, one per variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Variant key; unique within a cart.
    pub variant_id: VariantId,
    /// Product the variant belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    /// Product name (denormalized for display).
    pub name: String,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Unit price; carries the item currency.
    pub unit_price: Money,
    /// Quantity, always positive while in the cart.
    pub qty: i64,
}

impl CartItem {
    pub fn new(variant_id: VariantId, name: impl Into<String>, unit_price: Money, qty: i64) -> Self {
        Self {
            variant_id,
            product_id: None,
            name: name.into(),
            image: None,
            unit_price,
            qty,
        }
    }

    pub fn with_product_id(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// `unit_price × qty`.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price.checked_mul(self.qty)
    }
}

/// A shopping cart.
///
/// `subtotal` and `total` are derived; every mutating method recomputes
/// them before returning. There is no tax or shipping, so they are equal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Cart {
    /// Items in insertion order.
    pub items: Vec<CartItem>,
    /// Cart currency; adopted from the first item added to an empty cart.
    pub currency: Currency,
    /// Sum of line totals.
    pub subtotal: Money,
    /// Same as `subtotal`.
    pub total: Money,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, merging into an existing line with the same variant.
    ///
    /// Returns an error if:
    /// - Quantity is not positive
    /// - The item currency differs from the cart currency
    /// - Arithmetic overflow would occur
    pub fn add_item(&mut self, item: CartItem) -> Result<(), CommerceError> {
        if item.qty <= 0 {
            return Err(CommerceError::InvalidQuantity(item.qty));
        }

        let mut next = self.clone();
        if next.items.is_empty() {
            next.currency = item.unit_price.currency;
        } else if item.unit_price.currency != next.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: next.currency.code().to_string(),
                got: item.unit_price.currency.code().to_string(),
            });
        }

        if let Some(existing) = next.items.iter_mut().find(|i| i.variant_id == item.variant_id) {
            existing.qty = existing
                .qty
                .checked_add(item.qty)
                .ok_or(CommerceError::Overflow)?;
        } else {
            next.items.push(item);
        }

        // Only commit once the totals are known to fit.
        next.recompute()?;
        *self = next;
        Ok(())
    }

    /// Set the quantity of a line. A quantity of zero or less removes it.
    ///
    /// Returns whether a line with that variant existed.
    pub fn update_item(&mut self, variant_id: &VariantId, qty: i64) -> Result<bool, CommerceError> {
        if qty <= 0 {
            let removed = self.remove_item(variant_id)?;
            return Ok(removed);
        }

        let mut next = self.clone();
        let found = match next.items.iter_mut().find(|i| &i.variant_id == variant_id) {
            Some(item) => {
                item.qty = qty;
                true
            }
            None => false,
        };
        next.recompute()?;
        *self = next;
        Ok(found)
    }

    /// Remove a line. Returns whether it existed.
    pub fn remove_item(&mut self, variant_id: &VariantId) -> Result<bool, CommerceError> {
        let len_before = self.items.len();
        self.items.retain(|i| &i.variant_id != variant_id);
        let removed = self.items.len() < len_before;
        self.recompute()?;
        Ok(removed)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
        self.subtotal = Money::zero(self.currency);
        self.total = self.subtotal;
    }

    /// Recompute `subtotal` and `total` from the items.
    ///
    /// Fails when the money total or the summed quantity would overflow.
    pub fn recompute(&mut self) -> Result<(), CommerceError> {
        let mut subtotal = Money::zero(self.currency);
        let mut count: i64 = 0;
        for item in &self.items {
            subtotal = subtotal.checked_add(&item.line_total()?)?;
            count = count.checked_add(item.qty).ok_or(CommerceError::Overflow)?;
        }
        self.subtotal = subtotal;
        self.total = subtotal;
        Ok(())
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |count, i| count.saturating_add(i.qty))
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a line by variant.
    pub fn get_item(&self, variant_id: &VariantId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.variant_id == variant_id)
    }
}
