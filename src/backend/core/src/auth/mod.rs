//! Authentication: bearer token validation and the per-request identity
//! context derived from it.

pub mod claims;
pub mod context;
pub mod validator;

pub use claims::{Claims, ClaimsBuilder};
pub use context::{is_valid_organization_id, RequestContext, ORGANIZATION_OVERRIDE_HEADER};
pub use validator::TokenValidator;
