//! Role-based access control.
//!
//! This module provides:
//! - **Roles**: the dot-namespaced role convention and the built-in roles
//! - **Universe Gate**: endpoint-level check for `universe.` roles
//! - **Scope Resolution**: highest role -> CRUD permissions and ownership filter

pub mod gate;
pub mod roles;
pub mod scope;

pub use gate::UniverseRoleGate;
pub use roles::{
    has_universe_role, highest_role, is_universe_role, PredefinedRole, PredefinedScope,
    UNIVERSE_ROLE_PREFIX,
};
pub use scope::{PermissionSet, ResourceOwner, RoleScope, ScopeFilter};
