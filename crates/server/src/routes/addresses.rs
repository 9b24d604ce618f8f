//! Address book route handlers.
//!
//! Saved addresses are owned by the logged-in user; every operation is
//! scoped to the session user so one customer can never touch another's
//! addresses.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use luxjewels_core::AddressId;

use crate::db::AddressRepository;
use crate::db::addresses::NewAddress;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Address creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateAddressRequest {
    pub first_name: String,
    pub last_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl CreateAddressRequest {
    /// All fields except the second address line are required.
    fn has_blank_required_field(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.address_line1,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
            &self.phone,
        ]
        .into_iter()
        .any(|f| f.trim().is_empty())
    }
}

/// List the current user's saved addresses.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Value>> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(json!({"addresses": addresses})))
}

/// Save a new address for the current user.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    if body.has_blank_required_field() {
        return Err(AppError::BadRequest(
            "Missing required address fields".to_owned(),
        ));
    }

    let address = AddressRepository::new(state.pool())
        .create(
            user.id,
            &NewAddress {
                first_name: body.first_name,
                last_name: body.last_name,
                address_line1: body.address_line1,
                address_line2: body.address_line2,
                city: body.city,
                state: body.state,
                postal_code: body.postal_code,
                country: body.country,
                phone: body.phone,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({"address": address}))))
}

/// Remove one of the current user's saved addresses.
pub async fn destroy(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<AddressId>,
) -> Result<StatusCode> {
    let deleted = AddressRepository::new(state.pool())
        .delete(id, user.id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound("Address".to_owned()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateAddressRequest {
        CreateAddressRequest {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            address_line1: "12 Analytical Way".to_owned(),
            address_line2: None,
            city: "London".to_owned(),
            state: "LDN".to_owned(),
            postal_code: "EC1A 1AA".to_owned(),
            country: "GB".to_owned(),
            phone: "+44 20 7946 0000".to_owned(),
        }
    }

    #[test]
    fn test_complete_request_accepted() {
        assert!(!request().has_blank_required_field());
    }

    #[test]
    fn test_second_line_is_optional() {
        let mut body = request();
        body.address_line2 = None;
        assert!(!body.has_blank_required_field());
    }

    #[test]
    fn test_blank_required_field_detected() {
        let mut body = request();
        body.address_line1 = "   ".to_owned();
        assert!(body.has_blank_required_field());
    }
}
