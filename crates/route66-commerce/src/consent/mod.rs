//! Age verification, cookie consent and analytics gating.

mod analytics;
mod gate;

pub use analytics::{AnalyticsGate, AnalyticsSink, ConsentMode, RecordingSink};
pub use gate::{
    ConsentChoice, ConsentGate, ConsentSnapshot, GateState, GateStep, RemountReason, AGE_COOKIE,
    AGE_STEP_FOCUS, CONSENT_COOKIE, CONSENT_STEP_FOCUS,
};
