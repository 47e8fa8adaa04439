//! Predefined roles and the `universe.` convention.
//!
//! Roles are dot-namespaced `<scope>.<name>` strings. The platform ships ten
//! built-in roles:
//!
//! | Role                  | Scope        | Name   |
//! |-----------------------|--------------|--------|
//! | `universe.owner`      | universe     | owner  |
//! | `organization.owner`  | organization | owner  |
//! | `organization.editor` | organization | editor |
//! | `organization.viewer` | organization | viewer |
//! | `group.owner`         | group        | owner  |
//! | `group.editor`        | group        | editor |
//! | `group.viewer`        | group        | viewer |
//! | `member.owner`        | member       | owner  |
//! | `member.editor`       | member       | editor |
//! | `member.viewer`       | member       | viewer |
//!
//! Any role starting with `universe.` is elevated, built-in or not.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix that marks a role as elevated. Matching is case-sensitive.
pub const UNIVERSE_ROLE_PREFIX: &str = "universe.";

/// Whether a single role string is elevated.
pub fn is_universe_role(role: &str) -> bool {
    role.starts_with(UNIVERSE_ROLE_PREFIX)
}

/// Whether at least one role in the set is elevated.
pub fn has_universe_role<S: AsRef<str>>(roles: &[S]) -> bool {
    roles.iter().any(|r| is_universe_role(r.as_ref()))
}

/// Ownership scope encoded in the first segment of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredefinedScope {
    Universe,
    Organization,
    Group,
    Member,
    /// No recognizable role.
    Void,
}

/// Built-in role templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredefinedRole {
    #[serde(rename = "universe.owner")]
    UniverseOwner,
    #[serde(rename = "organization.owner")]
    OrganizationOwner,
    #[serde(rename = "organization.editor")]
    OrganizationEditor,
    #[serde(rename = "organization.viewer")]
    OrganizationViewer,
    #[serde(rename = "group.owner")]
    GroupOwner,
    #[serde(rename = "group.editor")]
    GroupEditor,
    #[serde(rename = "group.viewer")]
    GroupViewer,
    #[serde(rename = "member.owner")]
    MemberOwner,
    #[serde(rename = "member.editor")]
    MemberEditor,
    #[serde(rename = "member.viewer")]
    MemberViewer,
}

impl PredefinedRole {
    /// All built-in roles, highest priority first.
    pub const BY_PRIORITY: [PredefinedRole; 10] = [
        Self::UniverseOwner,
        Self::OrganizationOwner,
        Self::OrganizationEditor,
        Self::OrganizationViewer,
        Self::GroupOwner,
        Self::GroupEditor,
        Self::GroupViewer,
        Self::MemberOwner,
        Self::MemberEditor,
        Self::MemberViewer,
    ];

    /// Get the role identifier string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UniverseOwner => "universe.owner",
            Self::OrganizationOwner => "organization.owner",
            Self::OrganizationEditor => "organization.editor",
            Self::OrganizationViewer => "organization.viewer",
            Self::GroupOwner => "group.owner",
            Self::GroupEditor => "group.editor",
            Self::GroupViewer => "group.viewer",
            Self::MemberOwner => "member.owner",
            Self::MemberEditor => "member.editor",
            Self::MemberViewer => "member.viewer",
        }
    }

    pub const fn scope(&self) -> PredefinedScope {
        match self {
            Self::UniverseOwner => PredefinedScope::Universe,
            Self::OrganizationOwner | Self::OrganizationEditor | Self::OrganizationViewer => {
                PredefinedScope::Organization
            }
            Self::GroupOwner | Self::GroupEditor | Self::GroupViewer => PredefinedScope::Group,
            Self::MemberOwner | Self::MemberEditor | Self::MemberViewer => PredefinedScope::Member,
        }
    }

    /// Second segment of the role (`owner`, `editor`, `viewer`).
    pub fn name(&self) -> &'static str {
        let id = self.as_str();
        id.split_once('.').map(|(_, name)| name).unwrap_or(id)
    }
}

impl fmt::Display for PredefinedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredefinedRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::BY_PRIORITY
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or(())
    }
}

/// Highest built-in role present in `roles`, ignoring unknown strings.
pub fn highest_role<S: AsRef<str>>(roles: &[S]) -> Option<PredefinedRole> {
    PredefinedRole::BY_PRIORITY
        .into_iter()
        .find(|p| roles.iter().any(|r| r.as_ref() == p.as_str()))
}
