//! Request ids.

use std::fmt;

use uuid::Uuid;

/// Header carrying the request id in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest incoming id accepted as-is.
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// Unique request identifier, stored as a request extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new UUIDv4 request id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Reuse the caller's id when it is printable ASCII of sane length,
    /// otherwise generate one.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(id)
                if !id.is_empty()
                    && id.len() <= MAX_REQUEST_ID_LEN
                    && id.bytes().all(|b| b.is_ascii_graphic()) =>
            {
                Self(id.to_string())
            }
            _ => Self::generate(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique_uuid() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_from_header() {
        assert_eq!(RequestId::from_header(Some("abc-123")).as_str(), "abc-123");

        let generated = RequestId::from_header(Some("   "));
        assert!(Uuid::parse_str(generated.as_str()).is_ok());

        let too_long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        assert_ne!(RequestId::from_header(Some(&too_long)).as_str(), too_long);
        assert_ne!(RequestId::from_header(Some("has space")).as_str(), "has space");
        assert!(Uuid::parse_str(RequestId::from_header(None).as_str()).is_ok());
    }
}
