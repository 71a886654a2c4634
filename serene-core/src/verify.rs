use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{CoreError, CoreResult};

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_TOLERANCE_SECONDS: i64 = 300;

/// How an inbound event came to be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Signature recomputed and matched within the tolerance window.
    Trusted,
    /// No webhook secret is configured: the payload is accepted as-is. This
    /// is a reduced-security mode for local development; production
    /// deployments must configure a secret.
    SkippedUnconfigured,
}

/// Authenticate a raw webhook payload before anything in it is trusted.
/// `raw` must be the unparsed request bytes: the signature covers the exact
/// wire payload, so any body-parsing layer ahead of this call breaks it.
pub fn check_signature(
    raw: &[u8],
    signature_header: &str,
    secret: Option<&str>,
    tolerance_seconds: i64,
) -> CoreResult<Verification> {
    let Some(secret) = secret else {
        tracing::warn!("webhook secret not configured, accepting event without verification");
        return Ok(Verification::SkippedUnconfigured);
    };

    verify_signature(
        raw,
        signature_header,
        secret,
        tolerance_seconds,
        Utc::now().timestamp(),
    )?;
    Ok(Verification::Trusted)
}

/// Signature check against an explicit clock, `t=<unix>,v1=<hex>` header
/// format. The signed payload is `"<t>.<raw>"`; comparison is constant-time
/// via the mac itself.
pub fn verify_signature(
    raw: &[u8],
    signature_header: &str,
    secret: &str,
    tolerance_seconds: i64,
    now_unix: i64,
) -> CoreResult<()> {
    let mut timestamp_field: Option<&str> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp_field = Some(value),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp_field = timestamp_field
        .ok_or_else(|| CoreError::VerificationFailed("missing timestamp field".into()))?;
    if candidates.is_empty() {
        return Err(CoreError::VerificationFailed("missing v1 signature".into()));
    }

    let timestamp: i64 = timestamp_field
        .parse()
        .map_err(|_| CoreError::VerificationFailed("unparseable timestamp".into()))?;
    if (now_unix - timestamp).abs() > tolerance_seconds {
        return Err(CoreError::VerificationFailed(
            "timestamp outside tolerance window".into(),
        ));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CoreError::VerificationFailed(e.to_string()))?;
    mac.update(timestamp_field.as_bytes());
    mac.update(b".");
    mac.update(raw);

    for candidate in candidates {
        let Ok(decoded) = hex::decode(candidate) else {
            continue;
        };
        if mac.clone().verify_slice(&decoded).is_ok() {
            return Ok(());
        }
    }

    Err(CoreError::VerificationFailed("signature mismatch".into()))
}
