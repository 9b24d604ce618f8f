//! Admin customer list.

use axum::{Json, extract::State};

use crate::db::UserRepository;
use crate::db::users::CustomerSummary;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// List customers with their order counts and lifetime spend.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<CustomerSummary>>> {
    let customers = UserRepository::new(state.pool()).list_customers().await?;
    Ok(Json(customers))
}
