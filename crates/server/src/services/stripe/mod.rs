//! Stripe Checkout API client.
//!
//! The storefront delegates all payment handling to the gateway's hosted
//! checkout: we create a session with priced line items, redirect the
//! customer to its URL, and later retrieve the session to confirm payment
//! before creating the order. The gateway's REST API is form-encoded on the
//! way in and JSON on the way out.

mod error;
mod types;
pub mod webhook;

pub use error::{StripeError, WebhookError};
pub use types::{
    CheckoutLineItem, CheckoutSession, CreateCheckoutSession, CustomerDetails, GatewayAddress,
    PaymentStatus, cents_to_decimal, decimal_to_cents,
};
pub use webhook::{DEFAULT_TOLERANCE_SECS, WebhookEvent, verify_signature};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Stripe API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Error envelope returned by the gateway on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    secret_key: SecretString,
    base_url: String,
}

impl StripeClient {
    /// Create a new Stripe API client.
    #[must_use]
    pub fn new(secret_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key,
            base_url: BASE_URL.to_owned(),
        }
    }

    /// Create a hosted checkout session.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Http` on transport failure, `StripeError::Api`
    /// when the gateway rejects the request.
    pub async fn create_checkout_session(
        &self,
        input: &CreateCheckoutSession,
    ) -> Result<CheckoutSession, StripeError> {
        let params = build_session_params(input);

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.base_url))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&params)
            .send()
            .await?;

        Self::parse_session(response).await
    }

    /// Retrieve an existing checkout session by ID.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Http` on transport failure, `StripeError::Api`
    /// when the gateway rejects the request (including unknown session IDs).
    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let response = self
            .client
            .get(format!("{}/checkout/sessions/{session_id}", self.base_url))
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await?;

        Self::parse_session(response).await
    }

    async fn parse_session(response: reqwest::Response) -> Result<CheckoutSession, StripeError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or(body);
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))
    }
}

/// Flatten a session input into the gateway's bracketed form parameters.
fn build_session_params(input: &CreateCheckoutSession) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = vec![
        ("mode".into(), "payment".into()),
        ("payment_method_types[0]".into(), "card".into()),
        ("success_url".into(), input.success_url.clone()),
        ("cancel_url".into(), input.cancel_url.clone()),
        ("customer_email".into(), input.customer_email.clone()),
    ];

    for (i, line) in input.line_items.iter().enumerate() {
        params.push((
            format!("line_items[{i}][price_data][currency]"),
            input.currency.clone(),
        ));
        params.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            line.name.clone(),
        ));
        if let Some(url) = &line.image_url {
            params.push((
                format!("line_items[{i}][price_data][product_data][images][0]"),
                url.clone(),
            ));
        }
        params.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            line.unit_amount.to_string(),
        ));
        params.push((format!("line_items[{i}][quantity]"), line.quantity.to_string()));
    }

    for (key, value) in &input.metadata {
        params.push((format!("metadata[{key}]"), value.clone()));
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> CreateCheckoutSession {
        CreateCheckoutSession {
            success_url: "https://shop.test/checkout/success?session_id={CHECKOUT_SESSION_ID}"
                .to_owned(),
            cancel_url: "https://shop.test/checkout".to_owned(),
            customer_email: "customer@example.com".to_owned(),
            currency: "usd".to_owned(),
            line_items: vec![
                CheckoutLineItem {
                    name: "Diamond Solitaire Ring - Size 7".to_owned(),
                    image_url: Some("https://img.test/ring.jpg".to_owned()),
                    unit_amount: 499_999,
                    quantity: 1,
                },
                CheckoutLineItem {
                    name: "Pearl Stud Earrings".to_owned(),
                    image_url: None,
                    unit_amount: 19_999,
                    quantity: 2,
                },
            ],
            metadata: vec![("user_id".to_owned(), "7".to_owned())],
        }
    }

    #[test]
    fn test_build_session_params_shape() {
        let params = build_session_params(&sample_input());
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("customer_email"), Some("customer@example.com"));
        assert_eq!(
            get("line_items[0][price_data][product_data][name]"),
            Some("Diamond Solitaire Ring - Size 7")
        );
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("499999"));
        assert_eq!(get("line_items[1][quantity]"), Some("2"));
        assert_eq!(get("metadata[user_id]"), Some("7"));
    }

    #[test]
    fn test_build_session_params_omits_missing_image() {
        let params = build_session_params(&sample_input());
        assert!(
            params
                .iter()
                .any(|(k, _)| k == "line_items[0][price_data][product_data][images][0]")
        );
        assert!(
            !params
                .iter()
                .any(|(k, _)| k == "line_items[1][price_data][product_data][images][0]")
        );
    }
}
