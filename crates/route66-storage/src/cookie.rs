//! Cookie port and an in-memory jar.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::StorageError;

/// 180 days, the lifetime of every consent cookie.
pub const DEFAULT_COOKIE_MAX_AGE_SECS: i64 = 180 * 24 * 60 * 60;

/// `SameSite` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// A cookie with the attributes the storefront sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Path attribute.
    pub path: String,
    /// Lifetime in seconds.
    pub max_age_secs: i64,
    /// SameSite attribute.
    pub same_site: SameSite,
    /// Whether the cookie is only sent over HTTPS.
    pub secure: bool,
}

impl Cookie {
    /// Create a site-wide cookie with the default 180-day lifetime and `SameSite=Lax`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            max_age_secs: DEFAULT_COOKIE_MAX_AGE_SECS,
            same_site: SameSite::Lax,
            secure: false,
        }
    }

    /// Mark the cookie `Secure` (set when the page is served over HTTPS).
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Render as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let mut header = format!(
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            self.name,
            self.value,
            self.path,
            self.max_age_secs,
            self.same_site.as_str()
        );
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_header_value())
    }
}

/// The `document.cookie` port.
pub trait CookieStore {
    /// Read a cookie value by name.
    fn get(&self, name: &str) -> Option<String>;

    /// Write (or overwrite) a cookie.
    fn set(&self, cookie: Cookie) -> Result<(), StorageError>;
}

impl<T: CookieStore + ?Sized> CookieStore for Rc<T> {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&self, cookie: Cookie) -> Result<(), StorageError> {
        (**self).set(cookie)
    }
}

/// In-memory cookie jar.
///
/// Also records every write so a server can turn them into `Set-Cookie`
/// headers after running client logic against a request's cookies.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: RefCell<BTreeMap<String, Cookie>>,
    writes: RefCell<Vec<Cookie>>,
    blocked: Cell<bool>,
}

impl MemoryCookieJar {
    /// Create an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a jar from a `Cookie:` request header (`a=1; b=2`).
    ///
    /// Malformed pairs are skipped.
    pub fn from_header(header: &str) -> Self {
        let jar = Self::new();
        {
            let mut cookies = jar.cookies.borrow_mut();
            for pair in header.split(';') {
                let Some((name, value)) = pair.split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                cookies.insert(name.to_string(), Cookie::new(name, value.trim()));
            }
        }
        jar
    }

    /// Simulate cookies being blocked by the browser.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.set(blocked);
    }

    /// Full cookie (with attributes) by name.
    pub fn cookie(&self, name: &str) -> Option<Cookie> {
        self.cookies.borrow().get(name).cloned()
    }

    /// Drain the cookies written since the last call.
    pub fn take_writes(&self) -> Vec<Cookie> {
        std::mem::take(&mut *self.writes.borrow_mut())
    }

    /// Remove every cookie, as a user clearing site data would.
    pub fn clear(&self) {
        self.cookies.borrow_mut().clear();
    }
}

impl CookieStore for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        if self.blocked.get() {
            return None;
        }
        self.cookies.borrow().get(name).map(|c| c.value.clone())
    }

    fn set(&self, cookie: Cookie) -> Result<(), StorageError> {
        if self.blocked.get() {
            return Err(StorageError::Unavailable("cookies are blocked".to_string()));
        }
        self.writes.borrow_mut().push(cookie.clone());
        self.cookies.borrow_mut().insert(cookie.name.clone(), cookie);
        Ok(())
    }
}
