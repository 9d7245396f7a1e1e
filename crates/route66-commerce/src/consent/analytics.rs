//! Analytics activation.
//!
//! The tag is configured with consent mode `denied` before anything else
//! happens. The script itself is loaded only once the visitor is a verified
//! adult who accepted cookies, and never more than once per page.

use route66_storage::CookieStore;
use serde::{Deserialize, Serialize};

use super::gate::{ConsentChoice, ConsentSnapshot};
use crate::events::StoreEvent;

/// Analytics consent mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsentMode {
    #[default]
    Denied,
    Granted,
}

impl ConsentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentMode::Denied => "denied",
            ConsentMode::Granted => "granted",
        }
    }
}

/// Where analytics commands go (the tag manager on a real page).
pub trait AnalyticsSink {
    /// Update the analytics storage consent mode.
    fn set_consent_mode(&mut self, mode: ConsentMode);

    /// Inject and initialise the analytics script.
    fn load_script(&mut self, measurement_id: &str);
}

/// Sink double recording every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    pub modes: Vec<ConsentMode>,
    pub loads: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalyticsSink for RecordingSink {
    fn set_consent_mode(&mut self, mode: ConsentMode) {
        self.modes.push(mode);
    }

    fn load_script(&mut self, measurement_id: &str) {
        self.loads.push(measurement_id.to_string());
    }
}

/// Listener that grants analytics consent and loads the script.
pub struct AnalyticsGate<C, S> {
    cookies: C,
    sink: S,
    measurement_id: String,
    mode: ConsentMode,
    loaded: bool,
    /// Consent seen on the bus, for when cookies cannot be read back.
    observed: ConsentSnapshot,
}

impl<C: CookieStore, S: AnalyticsSink> AnalyticsGate<C, S> {
    /// Set consent mode `denied`, then grant right away if the cookies
    /// already allow it.
    pub fn init(cookies: C, mut sink: S, measurement_id: impl Into<String>) -> Self {
        sink.set_consent_mode(ConsentMode::Denied);
        let mut gate = Self {
            cookies,
            sink,
            measurement_id: measurement_id.into(),
            mode: ConsentMode::Denied,
            loaded: false,
            observed: ConsentSnapshot::default(),
        };
        gate.evaluate();
        gate
    }

    /// React to `age:confirmed` and `consent:updated`; other events are ignored.
    pub fn handle_event(&mut self, event: &StoreEvent) -> ConsentMode {
        match event {
            StoreEvent::AgeConfirmed => self.observed.age_verified = true,
            StoreEvent::ConsentUpdated(choice) => self.observed.cookie_consent = Some(*choice),
            _ => return self.mode,
        }
        self.evaluate()
    }

    /// Re-read consent and apply it.
    pub fn evaluate(&mut self) -> ConsentMode {
        let cookies = ConsentSnapshot::read(&self.cookies);
        // A fresh decision on the bus wins over an older cookie value.
        let snapshot = ConsentSnapshot {
            age_verified: cookies.age_verified || self.observed.age_verified,
            cookie_consent: self.observed.cookie_consent.or(cookies.cookie_consent),
        };

        let next = if snapshot.analytics_allowed() {
            ConsentMode::Granted
        } else {
            ConsentMode::Denied
        };

        if next == ConsentMode::Granted && !self.loaded {
            self.sink.load_script(&self.measurement_id);
            self.loaded = true;
            tracing::info!(measurement_id = %self.measurement_id, "analytics script loaded");
        }
        if next != self.mode {
            tracing::debug!(from = self.mode.as_str(), to = next.as_str(), "analytics consent mode changed");
            self.sink.set_consent_mode(next);
            self.mode = next;
        }
        self.mode
    }

    pub fn mode(&self) -> ConsentMode {
        self.mode
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The choice last seen on the bus, if any.
    pub fn observed_choice(&self) -> Option<ConsentChoice> {
        self.observed.cookie_consent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::{AGE_COOKIE, CONSENT_COOKIE};
    use route66_storage::{Cookie, MemoryCookieJar};
    use std::rc::Rc;

    fn gate(jar: &Rc<MemoryCookieJar>) -> AnalyticsGate<Rc<MemoryCookieJar>, RecordingSink> {
        AnalyticsGate::init(Rc::clone(jar), RecordingSink::new(), "G-TEST")
    }

    #[test]
    fn test_starts_denied() {
        let jar = Rc::new(MemoryCookieJar::new());
        let gate = gate(&jar);
        assert_eq!(gate.mode(), ConsentMode::Denied);
        assert_eq!(gate.sink().modes, vec![ConsentMode::Denied]);
        assert!(gate.sink().loads.is_empty());
    }

    #[test]
    fn test_loads_once_when_both_granted() {
        let jar = Rc::new(MemoryCookieJar::new());
        let mut gate = gate(&jar);

        jar.set(Cookie::new(AGE_COOKIE, "true")).unwrap();
        assert_eq!(gate.handle_event(&StoreEvent::AgeConfirmed), ConsentMode::Denied);
        assert!(!gate.is_loaded());

        jar.set(Cookie::new(CONSENT_COOKIE, "accepted")).unwrap();
        let event = StoreEvent::ConsentUpdated(ConsentChoice::Accepted);
        assert_eq!(gate.handle_event(&event), ConsentMode::Granted);
        assert_eq!(gate.handle_event(&event), ConsentMode::Granted);
        gate.evaluate();

        assert_eq!(gate.sink().loads, vec!["G-TEST".to_string()]);
        assert_eq!(
            gate.sink().modes,
            vec![ConsentMode::Denied, ConsentMode::Granted]
        );
    }

    #[test]
    fn test_rejected_stays_denied() {
        let jar = Rc::new(MemoryCookieJar::new());
        jar.set(Cookie::new(AGE_COOKIE, "true")).unwrap();
        let mut gate = gate(&jar);

        gate.handle_event(&StoreEvent::ConsentUpdated(ConsentChoice::Rejected));
        assert_eq!(gate.mode(), ConsentMode::Denied);
        assert!(!gate.is_loaded());
        assert_eq!(gate.observed_choice(), Some(ConsentChoice::Rejected));
    }

    #[test]
    fn test_accepted_without_age_stays_denied() {
        let jar = Rc::new(MemoryCookieJar::new());
        let mut gate = gate(&jar);
        gate.handle_event(&StoreEvent::ConsentUpdated(ConsentChoice::Accepted));
        assert_eq!(gate.mode(), ConsentMode::Denied);
    }

    #[test]
    fn test_returning_visitor_granted_on_init() {
        let jar = Rc::new(MemoryCookieJar::new());
        jar.set(Cookie::new(AGE_COOKIE, "true")).unwrap();
        jar.set(Cookie::new(CONSENT_COOKIE, "accepted")).unwrap();
        let gate = gate(&jar);
        assert_eq!(gate.mode(), ConsentMode::Granted);
        assert!(gate.is_loaded());
    }

    #[test]
    fn test_blocked_cookies_use_event_detail() {
        let jar = Rc::new(MemoryCookieJar::new());
        jar.set_blocked(true);
        let mut gate = gate(&jar);

        gate.handle_event(&StoreEvent::AgeConfirmed);
        gate.handle_event(&StoreEvent::ConsentUpdated(ConsentChoice::Accepted));
        assert_eq!(gate.mode(), ConsentMode::Granted);
        assert!(gate.is_loaded());
    }

    #[test]
    fn test_ignores_unrelated_events() {
        let jar = Rc::new(MemoryCookieJar::new());
        let mut gate = gate(&jar);
        gate.handle_event(&StoreEvent::CartClear);
        assert_eq!(gate.sink().modes.len(), 1);
    }
}
