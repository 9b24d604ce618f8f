//! Webhook signature verification and event parsing.
//!
//! The gateway signs each delivery with a `Stripe-Signature` header of the
//! form `t=<unix seconds>,v1=<hex hmac>[,v1=...]`. The signed payload is
//! `"{t}.{raw body}"`, keyed with the endpoint's webhook secret.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use super::error::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Default tolerance for the signed timestamp (5 minutes).
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// A parsed webhook event envelope.
///
/// `data.object` stays as raw JSON; each handler pulls the fields it needs.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

/// The `data` member of an event.
#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    /// Parse a verified payload into an event.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::BadPayload` if the JSON doesn't have the
    /// event envelope shape.
    pub fn parse(payload: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(payload).map_err(|e| WebhookError::BadPayload(e.to_string()))
    }

    /// The `id` field of the event object, if present.
    #[must_use]
    pub fn object_id(&self) -> Option<&str> {
        self.data.object.get("id").and_then(|v| v.as_str())
    }

    /// The checkout session ID recorded in the object's metadata, if any.
    ///
    /// Payment-intent events carry the originating session this way.
    #[must_use]
    pub fn metadata_session_id(&self) -> Option<&str> {
        self.data
            .object
            .get("metadata")
            .and_then(|m| m.get("session_id"))
            .and_then(|v| v.as_str())
    }
}

/// Verify a webhook signature header against the raw payload.
///
/// `now` is the current unix time in seconds; deliveries whose signed
/// timestamp is further than `tolerance_secs` away are rejected to limit
/// replay.
///
/// # Errors
///
/// Returns a `WebhookError` describing why verification failed.
pub fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), WebhookError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            return Err(WebhookError::BadHeader);
        };
        match key {
            "t" => {
                timestamp = Some(value.parse().map_err(|_| WebhookError::BadHeader)?);
            }
            "v1" => candidates.push(value),
            // Unknown schemes (v0, test signatures) are ignored.
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MissingTimestamp)?;
    if candidates.is_empty() {
        return Err(WebhookError::MissingSignature);
    }

    // abs_diff cannot overflow on extreme attacker-chosen timestamps
    if now.abs_diff(timestamp) > tolerance_secs.unsigned_abs() {
        return Err(WebhookError::TimestampOutOfTolerance);
    }

    let mut signed_payload = Vec::with_capacity(payload.len() + 16);
    signed_payload.extend_from_slice(timestamp.to_string().as_bytes());
    signed_payload.push(b'.');
    signed_payload.extend_from_slice(payload);

    for candidate in candidates {
        let Ok(expected) = hex::decode(candidate) else {
            continue;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return Err(WebhookError::BadSignature);
        };
        mac.update(&signed_payload);
        // verify_slice is constant-time.
        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }

    Err(WebhookError::BadSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    fn sign(payload: &[u8], timestamp: i64, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac key");
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let sig = sign(payload, 1_700_000_000, SECRET);
        let header = format!("t=1700000000,v1={sig}");

        assert_eq!(
            verify_signature(payload, &header, SECRET, 1_700_000_010, DEFAULT_TOLERANCE_SECS),
            Ok(())
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = b"{}";
        let sig = sign(payload, 1_700_000_000, "whsec_other");
        let header = format!("t=1700000000,v1={sig}");

        assert_eq!(
            verify_signature(payload, &header, SECRET, 1_700_000_000, DEFAULT_TOLERANCE_SECS),
            Err(WebhookError::BadSignature)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let payload = br#"{"amount": 100}"#;
        let sig = sign(payload, 1_700_000_000, SECRET);
        let header = format!("t=1700000000,v1={sig}");

        assert_eq!(
            verify_signature(
                br#"{"amount": 99999}"#,
                &header,
                SECRET,
                1_700_000_000,
                DEFAULT_TOLERANCE_SECS
            ),
            Err(WebhookError::BadSignature)
        );
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = b"{}";
        let sig = sign(payload, 1_700_000_000, SECRET);
        let header = format!("t=1700000000,v1={sig}");

        assert_eq!(
            verify_signature(payload, &header, SECRET, 1_700_001_000, DEFAULT_TOLERANCE_SECS),
            Err(WebhookError::TimestampOutOfTolerance)
        );
    }

    #[test]
    fn test_second_candidate_accepted() {
        // During secret rotation the gateway sends one v1 per active secret.
        let payload = b"{}";
        let good = sign(payload, 1_700_000_000, SECRET);
        let stale = sign(payload, 1_700_000_000, "whsec_retired");
        let header = format!("t=1700000000,v1={stale},v1={good}");

        assert_eq!(
            verify_signature(payload, &header, SECRET, 1_700_000_000, DEFAULT_TOLERANCE_SECS),
            Ok(())
        );
    }

    #[test]
    fn test_extreme_timestamps_rejected_without_panic() {
        // Unauthenticated deliveries control t=; subtraction must not overflow.
        let payload = b"{}";
        for t in [i64::MIN, i64::MAX] {
            let header = format!("t={t},v1=deadbeef");
            assert_eq!(
                verify_signature(payload, &header, SECRET, 1_700_000_000, DEFAULT_TOLERANCE_SECS),
                Err(WebhookError::TimestampOutOfTolerance)
            );
        }
    }

    #[test]
    fn test_missing_parts() {
        let payload = b"{}";
        assert_eq!(
            verify_signature(payload, "v1=abcd", SECRET, 0, DEFAULT_TOLERANCE_SECS),
            Err(WebhookError::MissingTimestamp)
        );
        assert_eq!(
            verify_signature(payload, "t=100", SECRET, 100, DEFAULT_TOLERANCE_SECS),
            Err(WebhookError::MissingSignature)
        );
        assert_eq!(
            verify_signature(payload, "nonsense", SECRET, 100, DEFAULT_TOLERANCE_SECS),
            Err(WebhookError::BadHeader)
        );
    }

    #[test]
    fn test_event_parse_and_metadata() {
        let payload = br#"{
            "type": "payment_intent.succeeded",
            "data": {
                "object": {
                    "id": "pi_123",
                    "metadata": {"session_id": "cs_test_789"}
                }
            }
        }"#;
        let event = WebhookEvent::parse(payload).expect("parse");
        assert_eq!(event.event_type, "payment_intent.succeeded");
        assert_eq!(event.object_id(), Some("pi_123"));
        assert_eq!(event.metadata_session_id(), Some("cs_test_789"));
    }
}
