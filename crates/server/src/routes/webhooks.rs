//! Payment gateway webhook receiver.
//!
//! The raw body is verified against the `Stripe-Signature` header before any
//! parsing. Events for sessions we have no order for are acknowledged as
//! no-ops so the gateway stops retrying; the success redirect usually wins
//! the race and creates the order first.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;
use secrecy::ExposeSecret;
use serde_json::{Value, json};

use luxjewels_core::OrderStatus;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::services::stripe::{DEFAULT_TOLERANCE_SECS, WebhookEvent, verify_signature};
use crate::state::AppState;

/// Signature header set by the gateway on every delivery.
const SIGNATURE_HEADER: &str = "stripe-signature";

/// Handle a webhook delivery from the payment gateway.
pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>)> {
    if state.config().demo_mode {
        return Ok((StatusCode::OK, Json(json!({"received": true}))));
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing signature header".to_owned()))?;

    verify_signature(
        &body,
        signature,
        state.config().stripe.webhook_secret.expose_secret(),
        Utc::now().timestamp(),
        DEFAULT_TOLERANCE_SECS,
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Webhook signature verification failed");
        AppError::BadRequest("Invalid signature".to_owned())
    })?;

    let event = WebhookEvent::parse(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed event payload: {e}")))?;

    if let Some((session_id, expected, next)) = status_transition(&event) {
        let updated = OrderRepository::new(state.pool())
            .update_status_by_session(session_id, expected, next)
            .await?;
        if next == OrderStatus::Cancelled {
            tracing::warn!(session_id, updated, "Payment failed");
        } else {
            tracing::info!(session_id, updated, "Payment succeeded");
        }
    } else if event.event_type == "checkout.session.completed" {
        // The success redirect creates the order already PROCESSING; this
        // event is informational.
        tracing::info!(session_id = event.object_id(), "Checkout session completed");
    } else {
        tracing::debug!(event_type = %event.event_type, "Ignoring webhook event");
    }

    Ok((StatusCode::OK, Json(json!({"received": true}))))
}

/// Order status transition implied by a gateway event, with the session it
/// applies to. `None` for events that carry no transition.
fn status_transition(event: &WebhookEvent) -> Option<(&str, Option<OrderStatus>, OrderStatus)> {
    match event.event_type.as_str() {
        "payment_intent.succeeded" => event
            .metadata_session_id()
            .map(|sid| (sid, Some(OrderStatus::Pending), OrderStatus::Processing)),
        "payment_intent.payment_failed" => event
            .metadata_session_id()
            .map(|sid| (sid, None, OrderStatus::Cancelled)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(json: &str) -> WebhookEvent {
        WebhookEvent::parse(json.as_bytes()).expect("event payload")
    }

    #[test]
    fn test_session_completed_carries_no_transition() {
        let e = event(
            r#"{"type": "checkout.session.completed",
                "data": {"object": {"id": "cs_test_1", "metadata": {"session_id": "cs_test_1"}}}}"#,
        );
        assert!(status_transition(&e).is_none());
    }

    #[test]
    fn test_payment_succeeded_promotes_pending_orders() {
        let e = event(
            r#"{"type": "payment_intent.succeeded",
                "data": {"object": {"id": "pi_1", "metadata": {"session_id": "cs_test_2"}}}}"#,
        );
        assert_eq!(
            status_transition(&e),
            Some(("cs_test_2", Some(OrderStatus::Pending), OrderStatus::Processing))
        );
    }

    #[test]
    fn test_payment_failed_cancels_regardless_of_status() {
        let e = event(
            r#"{"type": "payment_intent.payment_failed",
                "data": {"object": {"id": "pi_2", "metadata": {"session_id": "cs_test_3"}}}}"#,
        );
        assert_eq!(
            status_transition(&e),
            Some(("cs_test_3", None, OrderStatus::Cancelled))
        );
    }

    #[test]
    fn test_events_without_session_metadata_are_ignored() {
        let e = event(r#"{"type": "payment_intent.succeeded", "data": {"object": {"id": "pi_3"}}}"#);
        assert!(status_transition(&e).is_none());
    }
}
