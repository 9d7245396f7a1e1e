//! Checkout request handling.
//!
//! There is no payment step: a non-empty cart is confirmed on the spot and
//! given an order number derived from the clock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Days between receiving an order and the estimated ship date.
pub const SHIP_LEAD_DAYS: i64 = 3;

/// Order number prefix.
pub const ORDER_NUMBER_PREFIX: &str = "R66-";

/// Message returned when the cart has no items.
pub const EMPTY_CART_MESSAGE: &str = "Cart is empty.";

/// Message returned when the body is not a checkout request.
pub const INVALID_PAYLOAD_MESSAGE: &str = "Invalid checkout payload.";

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order accepted.
    #[default]
    Confirmed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "confirmed",
        }
    }
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub cart: Option<CheckoutCart>,
}

/// Cart section of a checkout request. Items are kept as sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutCart {
    #[serde(default)]
    pub items: Vec<Value>,
}

impl CheckoutRequest {
    /// Items in the request; missing `cart` or `items` means none.
    pub fn items(&self) -> &[Value] {
        self.cart.as_ref().map(|c| c.items.as_slice()).unwrap_or(&[])
    }
}

/// Successful checkout response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_number: String,
    pub status: OrderStatus,
    pub received_at: DateTime<Utc>,
    pub estimated_ship_date: DateTime<Utc>,
}

impl OrderConfirmation {
    /// Confirm an order received at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            order_number: order_number_for(now),
            status: OrderStatus::Confirmed,
            received_at: now,
            estimated_ship_date: now + Duration::days(SHIP_LEAD_DAYS),
        }
    }
}

/// Result of a checkout attempt, mapped 1:1 onto an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// 200 with the confirmation.
    Confirmed {
        confirmation: OrderConfirmation,
        items: Vec<Value>,
    },
    /// 400 with `{message}`.
    Rejected { message: String },
}

impl CheckoutOutcome {
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutOutcome::Confirmed { .. } => 200,
            CheckoutOutcome::Rejected { .. } => 400,
        }
    }

    /// JSON response body.
    pub fn body(&self) -> Value {
        match self {
            CheckoutOutcome::Confirmed { confirmation, .. } => {
                serde_json::to_value(confirmation).unwrap_or(Value::Null)
            }
            CheckoutOutcome::Rejected { message } => json!({ "message": message }),
        }
    }

    pub fn confirmation(&self) -> Option<&OrderConfirmation> {
        match self {
            CheckoutOutcome::Confirmed { confirmation, .. } => Some(confirmation),
            CheckoutOutcome::Rejected { .. } => None,
        }
    }
}

/// `"R66-"` plus the last six digits of the epoch milliseconds.
///
/// Two orders in the same millisecond, or exactly 1000 seconds apart, get
/// the same number.
pub fn order_number_for(now: DateTime<Utc>) -> String {
    format!(
        "{}{:06}",
        ORDER_NUMBER_PREFIX,
        now.timestamp_millis().rem_euclid(1_000_000)
    )
}

/// Validate a parsed checkout body and confirm it.
pub fn process_checkout(body: &Value, now: DateTime<Utc>) -> CheckoutOutcome {
    let request: CheckoutRequest = match serde_json::from_value(body.clone()) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "rejecting malformed checkout body");
            return CheckoutOutcome::Rejected {
                message: INVALID_PAYLOAD_MESSAGE.to_string(),
            };
        }
    };

    if request.items().is_empty() {
        return CheckoutOutcome::Rejected {
            message: EMPTY_CART_MESSAGE.to_string(),
        };
    }

    let confirmation = OrderConfirmation::new(now);
    tracing::info!(
        order_number = %confirmation.order_number,
        items = request.items().len(),
        "order confirmed"
    );
    CheckoutOutcome::Confirmed {
        confirmation,
        items: request.items().to_vec(),
    }
}

/// Like [`process_checkout`], starting from raw bytes.
pub fn process_checkout_bytes(body: &[u8], now: DateTime<Utc>) -> CheckoutOutcome {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => process_checkout(&value, now),
        Err(e) => {
            tracing::debug!(error = %e, "rejecting non-JSON checkout body");
            CheckoutOutcome::Rejected {
                message: INVALID_PAYLOAD_MESSAGE.to_string(),
            }
        }
    }
}
