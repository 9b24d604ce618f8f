//! External service clients and domain services.

pub mod auth;
pub mod stripe;
