use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use route66_observability::{RequestId, REQUEST_ID_HEADER};
use tracing::Instrument;

/// Middleware that propagates or generates a request ID.
///
/// If the incoming request has a usable `x-request-id` header, it is reused.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
/// - Recorded on the request's tracing span
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = RequestId::from_header(
        req.headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    );

    req.extensions_mut().insert(id.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %req.method(),
        path = %req.uri().path()
    );
    let mut res = next.run(req).instrument(span).await;

    if let Ok(val) = HeaderValue::from_str(id.as_str()) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }

    res
}
