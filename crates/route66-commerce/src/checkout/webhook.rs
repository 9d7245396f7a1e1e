//! Webhook signature verification (HMAC-SHA256).

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Optional prefix on the signature header value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Hex HMAC-SHA256 of `payload` keyed with `secret`.
pub fn sign_payload(payload: &[u8], secret: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Check a hex signature, optionally prefixed with `sha256=`.
///
/// Comparison is constant-time. Malformed signatures and empty secrets are
/// a mismatch, never an error.
pub fn verify_webhook_signature(payload: &[u8], signature: &str, secret: &[u8]) -> bool {
    if secret.is_empty() {
        return false;
    }
    let signature = signature.trim();
    let hex_part = signature.strip_prefix(SIGNATURE_PREFIX).unwrap_or(signature);
    let Ok(expected) = hex::decode(hex_part) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}
