//! Consent gate state machine.
//!
//! ```text
//!             mount / remount
//!                   |
//!   age cookie != "true" ---------> Open(Age)
//!   consent cookie unset ---------> Open(Consent)
//!   otherwise --------------------> Closed
//!
//!   Open(Age)     --confirm_age-->     Open(Consent) | Closed
//!   Open(Consent) --choose_consent-->  Closed
//! ```
//!
//! There is no path from `Closed` back to `Open` other than the cookies
//! disappearing and a remount noticing it.

use std::fmt;

use route66_storage::{Cookie, CookieStore};
use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::events::{EventBus, StoreEvent};
use crate::focus::FocusTrap;

/// Cookie holding `"true"` once the visitor confirmed their age.
pub const AGE_COOKIE: &str = "route66_age_verified";
/// Cookie holding `"accepted"` or `"rejected"`.
pub const CONSENT_COOKIE: &str = "cookieconsent_status";

/// Focusable elements of the age step.
pub const AGE_STEP_FOCUS: [&str; 2] = ["age-gate-confirm", "age-gate-leave"];
/// Focusable elements of the consent step.
pub const CONSENT_STEP_FOCUS: [&str; 3] =
    ["consent-accept", "consent-reject", "consent-policy-link"];

/// Cookie consent decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentChoice {
    Accepted,
    Rejected,
}

impl ConsentChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentChoice::Accepted => "accepted",
            ConsentChoice::Rejected => "rejected",
        }
    }

    /// Parse a cookie value; anything unexpected counts as unset.
    pub fn from_cookie(value: &str) -> Option<Self> {
        match value {
            "accepted" => Some(ConsentChoice::Accepted),
            "rejected" => Some(ConsentChoice::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ConsentChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Step shown while the gate is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStep {
    Age,
    Consent,
}

impl GateStep {
    fn focus_elements(&self) -> &'static [&'static str] {
        match self {
            GateStep::Age => &AGE_STEP_FOCUS,
            GateStep::Consent => &CONSENT_STEP_FOCUS,
        }
    }
}

/// Gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateState {
    Closed,
    Open(GateStep),
}

impl GateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Closed => "closed",
            GateState::Open(GateStep::Age) => "age",
            GateState::Open(GateStep::Consent) => "consent",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, GateState::Open(_))
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why the gate is being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemountReason {
    /// First render of the page.
    Mount,
    /// The tab became visible again.
    VisibilityRegained,
    /// The page was restored from the back-forward cache.
    BackForwardRestore,
}

/// Consent as stored in cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConsentSnapshot {
    pub age_verified: bool,
    pub cookie_consent: Option<ConsentChoice>,
}

impl ConsentSnapshot {
    /// Read both cookies.
    pub fn read(cookies: &impl CookieStore) -> Self {
        Self {
            age_verified: cookies.get(AGE_COOKIE).as_deref() == Some("true"),
            cookie_consent: cookies
                .get(CONSENT_COOKIE)
                .as_deref()
                .and_then(ConsentChoice::from_cookie),
        }
    }

    /// Combine with values remembered in memory.
    pub fn merge(self, other: ConsentSnapshot) -> Self {
        Self {
            age_verified: self.age_verified || other.age_verified,
            cookie_consent: self.cookie_consent.or(other.cookie_consent),
        }
    }

    /// State the gate should be in for this consent.
    pub fn gate_state(&self) -> GateState {
        if !self.age_verified {
            GateState::Open(GateStep::Age)
        } else if self.cookie_consent.is_none() {
            GateState::Open(GateStep::Consent)
        } else {
            GateState::Closed
        }
    }

    /// Analytics may load only for verified adults who accepted cookies.
    pub fn analytics_allowed(&self) -> bool {
        self.age_verified && self.cookie_consent == Some(ConsentChoice::Accepted)
    }
}

/// The age-gate and cookie-consent modal.
///
/// While open, the rest of the page is inert and focus cycles inside the
/// modal; on close, focus goes back to the element that had it when the
/// gate opened.
pub struct ConsentGate<C, B> {
    cookies: C,
    bus: B,
    secure: bool,
    state: GateState,
    /// Decisions whose cookie could not be written; kept for this session only.
    unsaved: ConsentSnapshot,
    focus: Option<FocusTrap>,
    restore_focus: Option<String>,
}

impl<C: CookieStore, B: EventBus> ConsentGate<C, B> {
    /// Create a closed gate. Call [`mount`](Self::mount) once the page renders.
    pub fn new(cookies: C, bus: B) -> Self {
        Self {
            cookies,
            bus,
            secure: false,
            state: GateState::Closed,
            unsaved: ConsentSnapshot::default(),
            focus: None,
            restore_focus: None,
        }
    }

    /// Write cookies with the `Secure` attribute (page served over HTTPS).
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Evaluate the cookies on first render. `active_element` is whatever
    /// had focus before the gate opened.
    pub fn mount(&mut self, active_element: Option<&str>) -> GateState {
        self.evaluate(RemountReason::Mount, active_element)
    }

    /// Re-evaluate after the page comes back from the background or bfcache.
    pub fn remount(&mut self, reason: RemountReason, active_element: Option<&str>) -> GateState {
        self.evaluate(reason, active_element)
    }

    /// Confirm the visitor is of age.
    pub fn confirm_age(&mut self) -> Result<GateState, CommerceError> {
        if self.state != GateState::Open(GateStep::Age) {
            return Err(self.invalid("confirm age"));
        }

        if !self.write_cookie(AGE_COOKIE, "true") {
            self.unsaved.age_verified = true;
        }
        self.bus.publish(StoreEvent::AgeConfirmed);

        let next = if self.snapshot().cookie_consent.is_none() {
            GateState::Open(GateStep::Consent)
        } else {
            GateState::Closed
        };
        self.transition(next, None);
        Ok(next)
    }

    /// Record the cookie consent decision and close the gate.
    pub fn choose_consent(&mut self, choice: ConsentChoice) -> Result<GateState, CommerceError> {
        if self.state != GateState::Open(GateStep::Consent) {
            return Err(self.invalid("choose consent"));
        }

        if !self.write_cookie(CONSENT_COOKIE, choice.as_str()) {
            self.unsaved.cookie_consent = Some(choice);
        }
        self.bus.publish(StoreEvent::ConsentUpdated(choice));

        self.transition(GateState::Closed, None);
        Ok(GateState::Closed)
    }

    /// Current state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Whether the modal is showing.
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Whether everything outside the modal is inert and aria-hidden.
    pub fn page_inert(&self) -> bool {
        self.is_open()
    }

    /// Consent as currently known (cookies plus unsaved decisions).
    pub fn snapshot(&self) -> ConsentSnapshot {
        ConsentSnapshot::read(&self.cookies).merge(self.unsaved)
    }

    /// Element holding focus inside the modal.
    pub fn focused_element(&self) -> Option<&str> {
        self.focus.as_ref().and_then(FocusTrap::current)
    }

    /// Handle Tab / Shift+Tab while open; focus never leaves the modal.
    pub fn handle_tab(&mut self, backwards: bool) -> Option<&str> {
        self.focus.as_mut().and_then(|trap| trap.tab(backwards))
    }

    /// Element to refocus after the gate closed, consumed once.
    pub fn take_restore_focus(&mut self) -> Option<String> {
        self.restore_focus.take()
    }

    fn evaluate(&mut self, reason: RemountReason, active_element: Option<&str>) -> GateState {
        let next = self.snapshot().gate_state();
        tracing::debug!(?reason, from = %self.state, to = %next, "evaluating consent gate");
        self.transition(next, active_element);
        next
    }

    fn transition(&mut self, next: GateState, active_element: Option<&str>) {
        match (self.state, next) {
            (GateState::Closed, GateState::Open(step)) => {
                self.focus = Some(FocusTrap::new(
                    step.focus_elements().iter().copied(),
                    active_element.map(str::to_string),
                ));
            }
            (GateState::Open(from), GateState::Open(to)) if from != to => {
                if let Some(trap) = self.focus.as_mut() {
                    trap.set_elements(to.focus_elements().iter().copied());
                }
            }
            (GateState::Open(_), GateState::Closed) => {
                self.restore_focus = self.focus.take().and_then(FocusTrap::release);
            }
            _ => {}
        }
        self.state = next;
    }

    /// Returns false when the cookie could not be stored.
    fn write_cookie(&self, name: &str, value: &str) -> bool {
        let cookie = Cookie::new(name, value).with_secure(self.secure);
        match self.cookies.set(cookie) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(cookie = name, error = %e, "failed to persist consent cookie");
                false
            }
        }
    }

    fn invalid(&self, action: &str) -> CommerceError {
        CommerceError::InvalidConsentTransition {
            state: self.state.to_string(),
            action: action.to_string(),
        }
    }
}
