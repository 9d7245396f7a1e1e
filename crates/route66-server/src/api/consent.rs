use std::rc::Rc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use route66_commerce::consent::{ConsentChoice, ConsentGate, ConsentSnapshot, GateState};
use route66_commerce::events::RecordingBus;
use route66_commerce::CommerceError;
use route66_observability::RequestId;
use route66_storage::MemoryCookieJar;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResponse};
use crate::AppState;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct ConsentData {
    age_verified: bool,
    cookie_consent: Option<ConsentChoice>,
    gate: &'static str,
    analytics_allowed: bool,
}

impl ConsentData {
    fn new(snapshot: ConsentSnapshot, gate: GateState) -> Self {
        Self {
            age_verified: snapshot.age_verified,
            cookie_consent: snapshot.cookie_consent,
            gate: gate.as_str(),
            analytics_allowed: snapshot.analytics_allowed(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ConsentUpdate {
    #[serde(default)]
    pub age_verified: bool,
    pub consent: Option<ConsentChoice>,
}

fn cookie_jar(headers: &HeaderMap) -> MemoryCookieJar {
    let raw = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");
    MemoryCookieJar::from_header(&raw)
}

pub(super) async fn get_consent(
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Json<ApiResponse<ConsentData>> {
    let snapshot = ConsentSnapshot::read(&cookie_jar(&headers));
    Json(ApiResponse::new(
        ConsentData::new(snapshot, snapshot.gate_state()),
        &req_id,
    ))
}

/// Outcome of replaying a consent update against the request's cookies.
struct Applied {
    data: ConsentData,
    set_cookies: Vec<String>,
}

/// Drive the consent gate the same way the modal would: mount, confirm age,
/// then record the consent choice. Cookie writes become `Set-Cookie` headers.
fn apply_update(
    headers: &HeaderMap,
    update: &ConsentUpdate,
    secure: bool,
) -> Result<Applied, CommerceError> {
    let jar = Rc::new(cookie_jar(headers));
    let mut gate = ConsentGate::new(Rc::clone(&jar), RecordingBus::new()).with_secure(secure);
    gate.mount(None);

    if update.age_verified && !gate.snapshot().age_verified {
        gate.confirm_age()?;
    }
    if let Some(choice) = update.consent {
        gate.choose_consent(choice)?;
    }

    Ok(Applied {
        data: ConsentData::new(gate.snapshot(), gate.state()),
        set_cookies: jar
            .take_writes()
            .iter()
            .map(|cookie| cookie.to_header_value())
            .collect(),
    })
}

pub(super) async fn update_consent(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(update): Json<ConsentUpdate>,
) -> Result<Response, ApiError> {
    let applied = apply_update(&headers, &update, state.secure_cookies).map_err(|e| match e {
        CommerceError::InvalidConsentTransition { .. } => {
            ApiError::new(&req_id, "conflict", e.to_string())
        }
        other => ApiError::new(&req_id, "internal_error", other.to_string()),
    })?;

    tracing::info!(
        gate = applied.data.gate,
        analytics_allowed = applied.data.analytics_allowed,
        cookies = applied.set_cookies.len(),
        "consent updated"
    );

    let mut response = Json(ApiResponse::new(applied.data, &req_id)).into_response();
    for cookie in applied.set_cookies {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    Ok(response)
}
