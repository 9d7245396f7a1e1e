use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use route66_commerce::checkout::{
    process_checkout_bytes, verify_webhook_signature, CheckoutOutcome, TransactionRecord,
};
use route66_observability::RequestId;
use serde::Serialize;

use super::{ApiError, ApiResponse};
use crate::AppState;

/// Header carrying `sha256=<hex hmac>` on incoming webhooks.
pub const SIGNATURE_HEADER: &str = "x-route66-signature";

/// The checkout stub answers with the bare confirmation or `{message}` body
/// the storefront expects, not the API envelope.
pub(super) async fn checkout(State(state): State<AppState>, body: Bytes) -> Response {
    let outcome = process_checkout_bytes(&body, Utc::now());

    match &outcome {
        CheckoutOutcome::Confirmed {
            confirmation,
            items,
        } => {
            let log = state.transaction_log.lock().await;
            log.record(TransactionRecord::new(confirmation, items.clone()));
        }
        CheckoutOutcome::Rejected { message } => {
            tracing::info!(reason = %message, "checkout rejected");
        }
    }

    let status = StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(outcome.body())).into_response()
}

#[derive(Debug, Serialize)]
pub(super) struct WebhookReceipt {
    received: bool,
    event: Option<String>,
}

pub(super) async fn order_webhook(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<WebhookReceipt>>, ApiError> {
    let Some(secret) = state.webhook_secret.as_deref() else {
        tracing::warn!("webhook received but no secret is configured");
        return Err(ApiError::new(
            &req_id,
            "service_unavailable",
            "webhooks are not configured",
        ));
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !verify_webhook_signature(&body, signature, secret.as_bytes()) {
        tracing::warn!("webhook signature mismatch");
        return Err(ApiError::new(&req_id, "unauthorized", "invalid signature"));
    }

    let event = serde_json::from_slice::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string));
    tracing::info!(event = event.as_deref().unwrap_or("unknown"), "webhook accepted");

    Ok(Json(ApiResponse::new(
        WebhookReceipt {
            received: true,
            event,
        },
        &req_id,
    )))
}
