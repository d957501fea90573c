//! Unverified JWT inspection
//!
//! The dashboard never validates signatures (the backend does); it only reads
//! the `exp` claim to decide when a speculative refresh is worthwhile.

use crate::error::{CoreError, CoreResult};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    exp: Option<i64>,
}

/// Expiry time of a JWT, if it carries an `exp` claim
pub fn expires_at(token: &str) -> CoreResult<Option<DateTime<Utc>>> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) => payload,
        _ => return Err(CoreError::invalid_token("expected three dot-separated segments")),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| CoreError::invalid_token(format!("payload is not base64url: {e}")))?;
    let claims: ExpiryClaim = serde_json::from_slice(&bytes)?;

    Ok(claims
        .exp
        .and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0)))
}
