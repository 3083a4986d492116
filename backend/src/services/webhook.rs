//! Auth provider webhook verification
//!
//! Deliveries are signed with the Svix scheme: an HMAC-SHA256 over
//! `"{svix-id}.{svix-timestamp}.{body}"`, keyed with the base64 payload of a
//! `whsec_` secret and sent as space-separated `v1,<base64>` entries.

use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_ID: &str = "svix-id";
pub const HEADER_TIMESTAMP: &str = "svix-timestamp";
pub const HEADER_SIGNATURE: &str = "svix-signature";

const SECRET_PREFIX: &str = "whsec_";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("No svix headers found")]
    MissingHeaders,

    #[error("Invalid signing secret")]
    InvalidSecret,

    #[error("Invalid timestamp header")]
    InvalidTimestamp,

    #[error("Message timestamp outside the tolerance window")]
    TimestampOutOfRange,

    #[error("No matching signature found")]
    SignatureMismatch,
}

/// The three signature headers of a delivery
#[derive(Debug, Clone)]
pub struct SignatureHeaders {
    pub id: String,
    pub timestamp: String,
    pub signature: String,
}

impl SignatureHeaders {
    /// Pull the signature headers from a request; all three are required
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, WebhookError> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or(WebhookError::MissingHeaders)
        };

        Ok(Self {
            id: get(HEADER_ID)?,
            timestamp: get(HEADER_TIMESTAMP)?,
            signature: get(HEADER_SIGNATURE)?,
        })
    }
}

/// Verifies signed webhook deliveries
#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: &str, tolerance_secs: i64) -> Result<Self, WebhookError> {
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let key = BASE64
            .decode(encoded)
            .map_err(|_| WebhookError::InvalidSecret)?;
        if key.is_empty() {
            return Err(WebhookError::InvalidSecret);
        }

        Ok(Self {
            key,
            tolerance_secs,
        })
    }

    /// Verify a delivery against the current time
    pub fn verify(&self, headers: &SignatureHeaders, body: &[u8]) -> Result<(), WebhookError> {
        self.verify_at(headers, body, Utc::now().timestamp())
    }

    pub fn verify_at(
        &self,
        headers: &SignatureHeaders,
        body: &[u8],
        now: i64,
    ) -> Result<(), WebhookError> {
        let timestamp: i64 = headers
            .timestamp
            .parse()
            .map_err(|_| WebhookError::InvalidTimestamp)?;
        if now.abs_diff(timestamp) > self.tolerance_secs.unsigned_abs() {
            return Err(WebhookError::TimestampOutOfRange);
        }

        let mac = self.mac(&headers.id, &headers.timestamp, body)?;

        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == "v1")
            .filter_map(|(_, signature)| BASE64.decode(signature).ok())
            .any(|expected| mac.clone().verify_slice(&expected).is_ok());

        if matched {
            Ok(())
        } else {
            Err(WebhookError::SignatureMismatch)
        }
    }

    /// Compute the `v1,<base64>` signature for a delivery
    pub fn sign(&self, id: &str, timestamp: &str, body: &[u8]) -> Result<String, WebhookError> {
        let mac = self.mac(id, timestamp, body)?;
        Ok(format!("v1,{}", BASE64.encode(mac.finalize().into_bytes())))
    }

    fn mac(&self, id: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, WebhookError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).map_err(|_| WebhookError::InvalidSecret)?;
        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        Ok(mac)
    }
}
