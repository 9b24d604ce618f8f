//! Integration tests for LuxJewels.
//!
//! These tests exercise a running server over HTTP; they are `#[ignore]`d by
//! default and meant for a seeded local environment.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and seed a local database, then start the server
//! cargo run -p luxjewels-cli -- migrate
//! cargo run -p luxjewels-cli -- seed
//! cargo run -p luxjewels-server
//!
//! # Run the ignored integration tests against it
//! cargo test -p luxjewels-integration-tests -- --ignored
//! ```

use reqwest::Client;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("LUX_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Shared context for tests hitting a running server.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Create a context with a cookie-storing client, so a login carries
    /// over to subsequent requests.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be constructed.
    #[must_use]
    pub fn new() -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url(),
        }
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Register a throwaway account and leave its session on the client.
    ///
    /// Uses a UUID-suffixed email so repeated runs don't collide.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or registration is rejected.
    pub async fn register_test_user(&self) -> String {
        let email = format!("test-{}@example.com", uuid::Uuid::new_v4());

        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&serde_json::json!({
                "first_name": "Test",
                "last_name": "Shopper",
                "email": email,
                "password": "integration-test-pw",
            }))
            .send()
            .await
            .expect("Failed to register test user");

        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
        email
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
