//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! lux-cli admin create -e admin@example.com -f Admin -l User -p <password>
//! ```

use thiserror::Error;
use tracing::info;

use luxjewels_core::{Email, UserRole};
use luxjewels_server::db::{self, UserRepository};
use luxjewels_server::services::auth::{self, AuthError};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email or password.
    #[error("Validation error: {0}")]
    Validation(#[from] AuthError),

    /// Repository error (duplicate email, etc.).
    #[error("Repository error: {0}")]
    Repository(#[from] db::RepositoryError),
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns `AdminError` if validation fails, the email is taken, or the
/// database is unreachable.
pub async fn create_user(
    email: &str,
    first_name: &str,
    last_name: &str,
    password: &str,
) -> Result<(), AdminError> {
    let database_url = super::database_url().map_err(AdminError::MissingEnvVar)?;

    let email = Email::parse(email).map_err(AuthError::from)?;
    auth::validate_password(password)?;
    let password_hash = auth::hash_password(password)?;

    let pool = db::create_pool(&database_url).await?;

    let user = UserRepository::new(&pool)
        .create_with_password(&email, first_name, last_name, UserRole::Admin, &password_hash)
        .await?;

    info!(user_id = %user.id, email = %user.email, "Admin user created");
    Ok(())
}
