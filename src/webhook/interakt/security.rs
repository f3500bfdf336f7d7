//! Security utilities for Interakt webhook verification
//!
//! Interakt signs webhook deliveries with HMAC-SHA256 over the raw request
//! body using the shared secret configured in the Interakt dashboard. The
//! hex digest is sent in the `x-interakt-signature` header, optionally with a
//! `sha256=` prefix.
//!
//! # Important Notes
//!
//! - The signature MUST be computed on the raw request body bytes, not parsed JSON
//! - The comparison must be constant-time to prevent timing attacks
//! - Whether a failed check blocks the request is decided by [`SignatureMode`]

use anyhow::bail;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::str::FromStr;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// What happens when a delivery is unsigned or its signature does not match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureMode {
    /// Log a warning and keep processing (ingestion availability first)
    #[default]
    WarnOnly,
    /// Reject the request with 401
    Enforce,
}

impl FromStr for SignatureMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "warn-only" | "warn_only" | "warn" => Ok(SignatureMode::WarnOnly),
            "enforce" | "reject" | "strict" => Ok(SignatureMode::Enforce),
            other => bail!("unknown signature mode: {other}"),
        }
    }
}

/// Outcome of checking one delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    /// No secret configured
    Skipped,
    Missing,
    Valid,
    Invalid,
}

impl SignatureCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureCheck::Skipped => "skipped",
            SignatureCheck::Missing => "missing",
            SignatureCheck::Valid => "valid",
            SignatureCheck::Invalid => "invalid",
        }
    }

    /// Whether the request may go on under `mode`
    pub fn is_allowed(&self, mode: SignatureMode) -> bool {
        match (self, mode) {
            (SignatureCheck::Skipped | SignatureCheck::Valid, _) => true,
            (_, SignatureMode::WarnOnly) => true,
            (_, SignatureMode::Enforce) => false,
        }
    }
}

/// Checks the signature header (if any) against the raw body
pub fn check_signature(
    signature_header: Option<&str>,
    payload: &[u8],
    secret: Option<&str>,
) -> SignatureCheck {
    let Some(secret) = secret else {
        return SignatureCheck::Skipped;
    };

    match signature_header.map(str::trim).filter(|h| !h.is_empty()) {
        None => SignatureCheck::Missing,
        Some(header) if verify_signature(header, payload, secret) => SignatureCheck::Valid,
        Some(_) => SignatureCheck::Invalid,
    }
}

/// Verifies the signature header against the request payload
///
/// # Arguments
///
/// * `signature_header` - The header value, `<hex>` or `sha256=<hex>`
/// * `payload` - The raw request body bytes
/// * `secret` - The shared webhook secret
///
/// # Returns
///
/// * `true` if the signature is valid
/// * `false` if the signature is invalid or the header can't be decoded
pub fn verify_signature(signature_header: &str, payload: &[u8], secret: &str) -> bool {
    let signature_hex = signature_header
        .trim()
        .strip_prefix("sha256=")
        .unwrap_or(signature_header.trim());

    let expected_signature = match hex::decode(signature_hex) {
        Ok(sig) => sig,
        Err(e) => {
            logfire::warn!(
                "Failed to decode signature hex: {error}",
                error = e.to_string()
            );
            return false;
        }
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(e) => {
            logfire::error!(
                "Failed to create HMAC instance: {error}",
                error = e.to_string()
            );
            return false;
        }
    };

    mac.update(payload);
    let computed_signature = mac.finalize().into_bytes();

    // ct_eq on slices of different length is false
    computed_signature.ct_eq(&expected_signature[..]).into()
}
