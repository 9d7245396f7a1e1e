//! Checkout module.
//!
//! Contains the checkout stub, the transaction log and webhook signature
//! verification.

mod log;
mod order;
mod webhook;

pub use log::{TransactionLog, TransactionRecord};
pub use order::{
    order_number_for, process_checkout, process_checkout_bytes, CheckoutCart, CheckoutOutcome,
    CheckoutRequest, OrderConfirmation, OrderStatus, EMPTY_CART_MESSAGE, INVALID_PAYLOAD_MESSAGE,
    ORDER_NUMBER_PREFIX, SHIP_LEAD_DAYS,
};
pub use webhook::{sign_payload, verify_webhook_signature, SIGNATURE_PREFIX};

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Process a checkout and append confirmed orders to `log`.
///
/// A failed log write is logged; the customer still gets their confirmation.
pub fn checkout_and_record(body: &Value, now: DateTime<Utc>, log: &TransactionLog) -> CheckoutOutcome {
    let outcome = process_checkout(body, now);
    if let CheckoutOutcome::Confirmed { confirmation, items } = &outcome {
        log.record(TransactionRecord::new(confirmation, items.clone()));
    }
    outcome
}
