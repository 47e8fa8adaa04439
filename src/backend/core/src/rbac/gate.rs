//! Universe role gate.
//!
//! Guards the small set of cross-organization and system-administration
//! endpoints. It does not replace resource-level RBAC in business services.

use tracing::debug;

use super::roles::has_universe_role;
use crate::auth::RequestContext;
use crate::error::{AuthzError, Result};

/// Stateless gate requiring at least one `universe.` role.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniverseRoleGate;

impl UniverseRoleGate {
    pub fn new() -> Self {
        Self
    }

    /// Decide for one request.
    ///
    /// `required` is the endpoint's declaration; `false` skips the gate.
    pub fn check(&self, required: bool, ctx: Option<&RequestContext>) -> Result<()> {
        if !required {
            return Ok(());
        }

        let ctx = ctx.ok_or(AuthzError::AuthenticationRequired)?;

        if has_universe_role(&ctx.roles) {
            return Ok(());
        }

        debug!(
            user_id = %ctx.user_id,
            roles = ?ctx.roles,
            "Universe role required"
        );
        Err(AuthzError::UniverseRoleRequired)
    }
}
