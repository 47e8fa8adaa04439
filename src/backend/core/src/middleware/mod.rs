//! HTTP middleware for Hydra Gate.
pub mod auth;

pub use auth::{AuthClaims, AuthorizationLayer, AuthorizationService, CurrentUser};
