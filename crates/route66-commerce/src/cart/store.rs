//! Persisted cart store.

use route66_storage::{Cache, KeyValueStore, StorageError};

use crate::cart::{Cart, CartItem};
use crate::error::CommerceError;
use crate::events::{CartAdd, StoreEvent};
use crate::ids::VariantId;
use crate::money::{Currency, Money};

/// Storage key of the cart snapshot.
pub const CART_STORAGE_KEY: &str = "route66_cart";

/// The cart for one browser tab, snapshotted to storage after every change.
///
/// The in-memory cart is authoritative: a failed write is logged and the
/// mutation stands.
pub struct CartStore<S> {
    cache: Cache<S>,
    cart: Cart,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Load the persisted snapshot, or start empty if there is none or it
    /// cannot be read.
    pub fn load(store: S) -> Self {
        let cache = Cache::new(store);
        let cart = match cache.get::<Cart>(CART_STORAGE_KEY) {
            Ok(Some(mut cart)) => match cart.recompute() {
                Ok(()) => cart,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding inconsistent cart snapshot");
                    discard_snapshot(&cache);
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(StorageError::Serialize(e)) => {
                tracing::warn!(error = %e, "discarding unreadable cart snapshot");
                discard_snapshot(&cache);
                Cart::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load cart snapshot, starting empty");
                Cart::new()
            }
        };
        Self { cache, cart }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn item_count(&self) -> i64 {
        self.cart.item_count()
    }

    /// Add an item, merging with an existing line for the same variant.
    pub fn add_item(&mut self, item: CartItem) -> Result<&Cart, CommerceError> {
        self.cart.add_item(item)?;
        self.persist();
        Ok(&self.cart)
    }

    /// Set a line's quantity; zero or less removes the line.
    pub fn update_item(&mut self, variant_id: &VariantId, qty: i64) -> Result<&Cart, CommerceError> {
        self.cart.update_item(variant_id, qty)?;
        self.persist();
        Ok(&self.cart)
    }

    /// Remove a line.
    pub fn remove_item(&mut self, variant_id: &VariantId) -> Result<&Cart, CommerceError> {
        self.cart.remove_item(variant_id)?;
        self.persist();
        Ok(&self.cart)
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) -> &Cart {
        self.cart.clear();
        self.persist();
        &self.cart
    }

    /// Apply a `cart:*` event. Other events are ignored.
    pub fn handle_event(&mut self, event: &StoreEvent) -> Result<(), CommerceError> {
        match event {
            StoreEvent::CartAdd(add) => {
                self.add_item(item_from_event(add)?)?;
            }
            StoreEvent::CartUpdate(update) => {
                self.update_item(&update.variant_id, update.qty)?;
            }
            StoreEvent::CartRemove(remove) => {
                self.remove_item(&remove.variant_id)?;
            }
            StoreEvent::CartClear => {
                self.clear_cart();
            }
            _ => {}
        }
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.cache.set(CART_STORAGE_KEY, &self.cart) {
            tracing::warn!(error = %e, "failed to persist cart snapshot");
        }
    }
}

fn discard_snapshot<S: KeyValueStore>(cache: &Cache<S>) {
    if let Err(e) = cache.delete(CART_STORAGE_KEY) {
        tracing::warn!(error = %e, "failed to remove cart snapshot");
    }
}

/// Convert a `cart:add` payload into a line item.
pub fn item_from_event(add: &CartAdd) -> Result<CartItem, CommerceError> {
    if !add.unit_price.is_finite() || add.unit_price < 0.0 {
        return Err(CommerceError::InvalidPrice(add.unit_price));
    }
    let currency: Currency = add.currency.parse()?;

    let mut item = CartItem::new(
        add.variant_id.clone(),
        add.name.clone(),
        Money::from_decimal(add.unit_price, currency),
        add.qty,
    )
    .with_product_id(add.product_id.clone());
    item.image = add.image.clone();
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CartRemove, CartUpdate};
    use crate::ids::ProductId;
    use route66_storage::{FileStore, MemoryStore};
    use std::rc::Rc;

    fn add_event(variant: &str, price: f64, qty: i64) -> StoreEvent {
        StoreEvent::CartAdd(CartAdd {
            product_id: ProductId::new("blue-dream"),
            variant_id: VariantId::new(variant),
            name: "Blue Dream".to_string(),
            image: None,
            unit_price: price,
            currency: "USD".to_string(),
            qty,
        })
    }

    #[test]
    fn test_mutations_are_persisted() {
        let backing = Rc::new(MemoryStore::new());
        let mut store = CartStore::load(Rc::clone(&backing));
        store.handle_event(&add_event("x", 10.0, 1)).unwrap();
        store.handle_event(&add_event("x", 10.0, 1)).unwrap();

        let reloaded = CartStore::load(Rc::clone(&backing));
        assert_eq!(reloaded.cart().items.len(), 1);
        assert_eq!(reloaded.cart().items[0].qty, 2);
        assert_eq!(reloaded.cart().subtotal.amount_cents, 2000);
    }

    #[test]
    fn test_update_remove_clear_events() {
        let mut store = CartStore::load(MemoryStore::new());
        store.handle_event(&add_event("a", 5.0, 1)).unwrap();
        store.handle_event(&add_event("b", 7.5, 2)).unwrap();

        store
            .handle_event(&StoreEvent::CartUpdate(CartUpdate {
                variant_id: VariantId::new("a"),
                qty: 3,
            }))
            .unwrap();
        assert_eq!(store.cart().total.amount_cents, 3000);

        store
            .handle_event(&StoreEvent::CartRemove(CartRemove {
                variant_id: VariantId::new("b"),
            }))
            .unwrap();
        assert_eq!(store.item_count(), 3);

        store.handle_event(&StoreEvent::CartClear).unwrap();
        assert!(store.cart().is_empty());
        store.handle_event(&StoreEvent::AgeConfirmed).unwrap();
    }

    #[test]
    fn test_unavailable_storage_keeps_memory_state() {
        let backing = Rc::new(MemoryStore::new());
        backing.set_unavailable(true);
        let mut store = CartStore::load(Rc::clone(&backing));

        store.handle_event(&add_event("x", 10.0, 1)).unwrap();
        assert_eq!(store.item_count(), 1);

        backing.set_unavailable(false);
        assert!(backing.get(CART_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty() {
        let backing = Rc::new(MemoryStore::new());
        backing.set(CART_STORAGE_KEY, b"{not json").unwrap();
        let store = CartStore::load(Rc::clone(&backing));
        assert!(store.cart().is_empty());
        assert!(backing.get(CART_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_overflowing_snapshot_is_discarded() {
        let backing = Rc::new(MemoryStore::new());
        let huge = i64::MAX / 2 + 1;
        let snapshot = format!(
            r#"{{"items":[
                {{"variantId":"a","name":"A","unitPrice":{{"amount_cents":0,"currency":"USD"}},"qty":{huge}}},
                {{"variantId":"b","name":"B","unitPrice":{{"amount_cents":0,"currency":"USD"}},"qty":{huge}}}
            ],"currency":"USD","subtotal":{{"amount_cents":0,"currency":"USD"}},"total":{{"amount_cents":0,"currency":"USD"}}}}"#
        );
        backing.set(CART_STORAGE_KEY, snapshot.as_bytes()).unwrap();

        let store = CartStore::load(Rc::clone(&backing));
        assert!(store.cart().is_empty());
        assert_eq!(store.item_count(), 0);
        assert!(backing.get(CART_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_invalid_event_price() {
        let mut store = CartStore::load(MemoryStore::new());
        assert!(matches!(
            store.handle_event(&add_event("x", f64::NAN, 1)),
            Err(CommerceError::InvalidPrice(_))
        ));
        assert!(matches!(
            store.handle_event(&add_event("x", -1.0, 1)),
            Err(CommerceError::InvalidPrice(_))
        ));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = CartStore::load(FileStore::open(dir.path()).unwrap());
            store.handle_event(&add_event("x", 12.25, 2)).unwrap();
        }
        let store = CartStore::load(FileStore::open(dir.path()).unwrap());
        assert_eq!(store.cart().subtotal.amount_cents, 2450);
        assert_eq!(
            store.cart().items[0].product_id,
            Some(ProductId::new("blue-dream"))
        );
    }
}
