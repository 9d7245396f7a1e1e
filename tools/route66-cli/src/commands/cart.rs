//! Local cart commands.
//!
//! The cart is persisted the same way the storefront persists it, as one
//! JSON snapshot under the cart storage key, here in a directory instead of
//! browser storage.

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use route66_commerce::cart::{Cart, CartStore};
use route66_commerce::catalog::Product;
use route66_commerce::checkout::{checkout_and_record, CheckoutOutcome};
use route66_commerce::events::{CartAdd, CartRemove, CartUpdate, StoreEvent};
use route66_commerce::ids::{ProductId, VariantId};
use route66_commerce::money::Currency;
use route66_storage::KeyValueStore;
use serde_json::json;

use super::{CartArgs, CartCommand};
use crate::context::Context;

/// Run the cart command.
pub fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let mut store = CartStore::load(ctx.cart_store(args.store.as_deref())?);

    match args.command {
        CartCommand::Show => {}
        CartCommand::Add { product, size, qty } => {
            let products = ctx.load_catalog(args.source.catalog.as_deref())?;
            let event = add_event(&products, &product, &size, qty)?;
            store.handle_event(&event)?;
            ctx.output.success(&format!("Added {} x {} ({})", qty, product, size));
        }
        CartCommand::Update { variant, qty } => {
            let variant_id = VariantId::new(variant);
            ensure_line(store.cart(), &variant_id)?;
            store.handle_event(&StoreEvent::CartUpdate(CartUpdate { variant_id, qty }))?;
            ctx.output.success("Cart updated");
        }
        CartCommand::Remove { variant } => {
            let variant_id = VariantId::new(variant);
            ensure_line(store.cart(), &variant_id)?;
            store.handle_event(&StoreEvent::CartRemove(CartRemove { variant_id }))?;
            ctx.output.success("Removed from cart");
        }
        CartCommand::Clear => {
            store.handle_event(&StoreEvent::CartClear)?;
            ctx.output.success("Cart cleared");
        }
        CartCommand::Checkout => return checkout(&mut store, ctx),
    }

    print_cart(store.cart(), ctx);
    Ok(())
}

/// Build the `cart:add` event a product card would publish.
pub fn add_event(products: &[Product], product: &str, size: &str, qty: i64) -> Result<StoreEvent> {
    let wanted = ProductId::from_name(product);
    let found = products
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(product) || p.id() == wanted)
        .ok_or_else(|| anyhow!("No product named '{}'", product))?;

    let unit_price = found.price_for(size).ok_or_else(|| {
        anyhow!(
            "'{}' has no size '{}' (sizes: {})",
            found.name,
            size,
            found.size_options.join(", ")
        )
    })?;
    if !found.is_size_available(size) {
        bail!("{} {} is out of stock", found.name, size);
    }

    Ok(StoreEvent::CartAdd(CartAdd {
        product_id: found.id(),
        variant_id: found.variant_id(size),
        name: format!("{} {}", found.name, size),
        image: None,
        unit_price,
        currency: Currency::default().code().to_string(),
        qty,
    }))
}

fn ensure_line(cart: &Cart, variant_id: &VariantId) -> Result<()> {
    if cart.get_item(variant_id).is_none() {
        bail!("No cart line for '{}'", variant_id);
    }
    Ok(())
}

fn checkout<S: KeyValueStore>(store: &mut CartStore<S>, ctx: &Context) -> Result<()> {
    let body = json!({ "cart": serde_json::to_value(store.cart())? });
    let log = ctx.transaction_log();
    let outcome = checkout_and_record(&body, Utc::now(), &log);

    match &outcome {
        CheckoutOutcome::Confirmed { confirmation, .. } => {
            store.clear_cart();
            if ctx.output.is_json() {
                ctx.output.json(&outcome.body());
                return Ok(());
            }
            ctx.output
                .success(&format!("Order {} confirmed", confirmation.order_number));
            ctx.output.kv(
                "estimated ship date",
                &confirmation.estimated_ship_date.format("%Y-%m-%d").to_string(),
            );
            ctx.output.kv("logged to", &log.path().display().to_string());
            Ok(())
        }
        CheckoutOutcome::Rejected { message } => bail!("Checkout rejected: {}", message),
    }
}

fn print_cart(cart: &Cart, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(cart);
        return;
    }

    if cart.is_empty() {
        ctx.output.info("Cart is empty");
        return;
    }

    ctx.output.header("Cart");
    for item in &cart.items {
        let line = item
            .line_total()
            .map(|m| m.to_string())
            .unwrap_or_else(|_| "overflow".to_string());
        ctx.output.table_row(
            &[
                item.variant_id.as_str(),
                &item.name,
                &format!("x{}", item.qty),
                &line,
            ],
            &[28, 28, 6, 10],
        );
    }
    ctx.output.kv("items", &cart.item_count().to_string());
    ctx.output.kv("subtotal", &cart.subtotal.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use route66_commerce::catalog::parse_catalog;
    use route66_storage::FileStore;

    fn products() -> Vec<Product> {
        parse_catalog(
            r#"[
                {"name": "Blue Dream", "category": "Flower", "size_options": ["3.5g", "7g"], "prices": {"3.5g": 30, "7g": 55}, "availability": {"7g": false}}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_add_event_by_name_or_id() {
        let products = products();
        for name in ["Blue Dream", "blue dream", "blue-dream"] {
            let StoreEvent::CartAdd(add) = add_event(&products, name, "3.5g", 2).unwrap() else {
                panic!("expected cart:add");
            };
            assert_eq!(add.variant_id.as_str(), "blue-dream-3-5g");
            assert_eq!(add.unit_price, 30.0);
            assert_eq!(add.currency, "USD");
            assert_eq!(add.qty, 2);
        }
    }

    #[test]
    fn test_add_event_rejects_unknown_and_sold_out() {
        let products = products();
        assert!(add_event(&products, "Purple Haze", "3.5g", 1).is_err());
        assert!(add_event(&products, "Blue Dream", "14g", 1).is_err());
        let err = add_event(&products, "Blue Dream", "7g", 1).unwrap_err();
        assert!(err.to_string().contains("out of stock"));
    }

    #[test]
    fn test_cart_persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let products = products();

        {
            let mut store = CartStore::load(FileStore::open(dir.path()).unwrap());
            store
                .handle_event(&add_event(&products, "Blue Dream", "3.5g", 1).unwrap())
                .unwrap();
            store
                .handle_event(&add_event(&products, "Blue Dream", "3.5g", 2).unwrap())
                .unwrap();
        }

        let store = CartStore::load(FileStore::open(dir.path()).unwrap());
        assert_eq!(store.cart().items.len(), 1);
        assert_eq!(store.item_count(), 3);
        assert_eq!(store.cart().subtotal.amount_cents, 9000);
    }
}
