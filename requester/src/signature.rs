//! Request signing.
//!
//! Signature algorithm:
//! `Base64(HMAC-SHA1(secret, "AWSMechanicalTurkRequester" + operation + timestamp))`

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Service name prefixed to every signed message.
pub const SERVICE: &str = "AWSMechanicalTurkRequester";

/// Format a request timestamp as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Compute the request signature for an operation at a given timestamp.
pub fn sign(operation: &str, timestamp: &str, secret_access_key: &str) -> String {
    let message = format!("{SERVICE}{operation}{timestamp}");

    let mut mac =
        HmacSha1::new_from_slice(secret_access_key.as_bytes()).expect("HMAC can take any size");
    mac.update(message.as_bytes());

    BASE64.encode(mac.finalize().into_bytes())
}
