//! Local JWT expiry inspection
//!
//! Tokens come straight from the session endpoint we just authenticated
//! against, so only the payload is decoded; the signature is never verified.
//! Reusing this against tokens from another issuer needs real verification.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Number;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    #[serde(default)]
    exp: Option<Number>,
}

/// Read the `exp` claim of a JWT without contacting the network.
///
/// Returns `None` when the token is malformed or carries no expiry.
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: ExpiryClaims = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.exp?;
    let seconds = exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?;

    DateTime::from_timestamp(seconds, 0)
}

/// True when the expiry is unknown or falls within `margin` of `now`.
pub fn expires_within(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>, margin: Duration) -> bool {
    match expires_at {
        Some(exp) => exp - now <= margin,
        None => true,
    }
}
