//! Per-request identity context.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::claims::Claims;
use crate::rbac::roles::{has_universe_role, PredefinedRole};

/// Header a universe caller uses to act inside one organization.
pub const ORGANIZATION_OVERRIDE_HEADER: &str = "x-organization-id";

/// Normalized identity record consumed by gates and handlers.
///
/// Built once per request from validated [`Claims`] and never mutated
/// afterwards; derivations return a new value. [`RequestContext::empty`] is
/// the anonymous fallback so downstream code never deals with a missing
/// context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub user_id: String,
    pub username: String,
    pub roles: Vec<String>,
    pub org_id: String,
    pub group_id: String,
    pub agent_id: String,
    pub app_id: String,
    /// Service name -> license tier string; empty when the token had none.
    #[serde(default)]
    pub licenses: BTreeMap<String, String>,
}

impl RequestContext {
    /// Context with every field empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Map validated claims into a context. Pure field remapping.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            username: claims.username.clone(),
            roles: claims.roles.clone(),
            org_id: claims.org_id.clone(),
            group_id: claims.group_id.clone(),
            agent_id: claims.agent_id.clone(),
            app_id: claims.app_id.clone(),
            licenses: claims.licenses.clone().unwrap_or_default(),
        }
    }

    /// Context for optional claims: `None` yields [`RequestContext::empty`].
    pub fn from_optional_claims(claims: Option<&Claims>) -> Self {
        claims.map(Self::from_claims).unwrap_or_default()
    }

    /// Whether the context carries an authenticated subject.
    pub fn is_authenticated(&self) -> bool {
        !self.user_id.is_empty()
    }

    /// Whether any role carries the `universe.` prefix.
    pub fn has_universe_role(&self) -> bool {
        has_universe_role(&self.roles)
    }

    /// Raw license string for a service.
    pub fn license_for(&self, service: &str) -> Option<&str> {
        self.licenses.get(service).map(String::as_str)
    }

    /// Context scoped to another organization, acting as its owner.
    ///
    /// Only meaningful for universe callers; the pipeline decides when to
    /// call it.
    pub fn scoped_to_organization(&self, org_id: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            roles: vec![PredefinedRole::OrganizationOwner.as_str().to_string()],
            ..self.clone()
        }
    }
}

/// Whether `id` has the 24-hex-digit shape of an organization id.
pub fn is_valid_organization_id(id: &str) -> bool {
    id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit())
}
