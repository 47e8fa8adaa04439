//! Role scope resolution for resource-level RBAC.
//!
//! Business services use this to turn a caller's highest role into CRUD
//! permission flags and an ownership filter. This is independent of the
//! universe gate, which only guards system-administration endpoints.

use serde::{Deserialize, Serialize};

use super::roles::{highest_role, PredefinedRole, PredefinedScope};
use crate::auth::RequestContext;

/// CRUD permissions granted by a role name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    pub allow_administrative: bool,
    pub allow_find: bool,
    pub allow_create: bool,
    pub allow_update: bool,
    pub allow_hard_delete: bool,
    pub allow_soft_delete: bool,
}

impl PermissionSet {
    /// Permissions for a role name (`owner`, `editor`, `viewer`). Unknown names
    /// get nothing.
    pub fn for_role_name(name: &str) -> Self {
        match name {
            "owner" => Self {
                allow_administrative: true,
                allow_find: true,
                allow_create: true,
                allow_update: true,
                allow_hard_delete: true,
                allow_soft_delete: true,
            },
            "editor" => Self {
                allow_find: true,
                allow_create: true,
                allow_update: true,
                allow_soft_delete: true,
                ..Self::default()
            },
            "viewer" => Self {
                allow_find: true,
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

/// Ownership restriction applied to resource queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum ScopeFilter {
    /// Every resource, across organizations.
    Unrestricted,
    Organization {
        org_id: String,
    },
    Group {
        org_id: String,
        group_id: String,
    },
    /// Resources owned by the user or by the agent, inside the group.
    Member {
        org_id: String,
        group_id: String,
        user_id: String,
        agent_id: String,
    },
    /// Matches nothing.
    Deny,
}

impl ScopeFilter {
    /// Whether a resource with the given owner fields passes the filter.
    pub fn matches(&self, owner: &ResourceOwner<'_>) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Organization { org_id } => owner.org_id == org_id,
            Self::Group { org_id, group_id } => {
                owner.org_id == org_id && owner.group_id == group_id
            }
            Self::Member {
                org_id,
                group_id,
                user_id,
                agent_id,
            } => {
                owner.org_id == org_id
                    && owner.group_id == group_id
                    && (owner.user_id == user_id || owner.agent_id == agent_id)
            }
            Self::Deny => false,
        }
    }
}

/// Owner fields of a stored resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceOwner<'a> {
    pub org_id: &'a str,
    pub group_id: &'a str,
    pub user_id: &'a str,
    pub agent_id: &'a str,
}

/// Resolved access for one caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleScope {
    pub role: Option<PredefinedRole>,
    pub scope: PredefinedScope,
    pub permissions: PermissionSet,
    pub filter: ScopeFilter,
}

impl RoleScope {
    /// Resolve permissions and ownership filter from the caller's highest
    /// built-in role.
    pub fn resolve(ctx: &RequestContext) -> Self {
        let role = highest_role(&ctx.roles);
        let scope = role.map(|r| r.scope()).unwrap_or(PredefinedScope::Void);
        let permissions = role
            .map(|r| PermissionSet::for_role_name(r.name()))
            .unwrap_or_default();

        let filter = match scope {
            PredefinedScope::Universe => ScopeFilter::Unrestricted,
            PredefinedScope::Organization => ScopeFilter::Organization {
                org_id: ctx.org_id.clone(),
            },
            PredefinedScope::Group => ScopeFilter::Group {
                org_id: ctx.org_id.clone(),
                group_id: ctx.group_id.clone(),
            },
            PredefinedScope::Member => ScopeFilter::Member {
                org_id: ctx.org_id.clone(),
                group_id: ctx.group_id.clone(),
                user_id: ctx.user_id.clone(),
                agent_id: ctx.agent_id.clone(),
            },
            PredefinedScope::Void => ScopeFilter::Deny,
        };

        tracing::trace!(?role, ?scope, ?filter, "Resolved role scope");

        Self {
            role,
            scope,
            permissions,
            filter,
        }
    }
}
