//! JWT claims carried by access tokens issued by the identity service.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::license::LicenseTier;

/// Decoded, verified payload of a bearer token.
///
/// Only `sub` is mandatory (enforced by the validator, not by serde). Every
/// other field falls back to an empty value when absent or `null`, and the
/// license map stays `None` when the issuer did not embed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject (user ID)
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,

    /// Account status (active, inactive, pending)
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,

    /// Roles in issuer order
    #[serde(default, deserialize_with = "lenient_roles")]
    pub roles: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub org_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub group_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub agent_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub app_id: String,

    /// Service name -> license tier string for the caller's organization.
    /// `null` entries are dropped; other non-string entries keep their JSON
    /// text so the license gate reports them as invalid tiers.
    #[serde(
        default,
        deserialize_with = "lenient_licenses",
        skip_serializing_if = "Option::is_none"
    )]
    pub licenses: Option<BTreeMap<String, String>>,

    /// Token ID for revocation tracking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Issued at timestamp
    #[serde(default)]
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// String form of a claim value. `None` for `null`.
fn claim_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_roles<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let roles = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(roles.into_iter().filter_map(claim_text).collect())
}

fn lenient_licenses<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let licenses = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(licenses.map(|entries| {
        entries
            .into_iter()
            .filter_map(|(service, tier)| claim_text(tier).map(|tier| (service, tier)))
            .collect()
    }))
}

impl Claims {
    /// Create claims with builder pattern.
    pub fn builder(user_id: impl Into<String>) -> ClaimsBuilder {
        ClaimsBuilder::new(user_id)
    }

    /// Get the user ID.
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    /// Check if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Get the expiration time.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Raw license string for a service, if the token carries one.
    pub fn license_for(&self, service: &str) -> Option<&str> {
        self.licenses
            .as_ref()
            .and_then(|m| m.get(service))
            .map(String::as_str)
    }
}

/// Builder for JWT claims.
pub struct ClaimsBuilder {
    claims: Claims,
}

impl ClaimsBuilder {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            claims: Claims {
                sub: user_id.into(),
                username: String::new(),
                status: "active".to_string(),
                roles: Vec::new(),
                org_id: String::new(),
                group_id: String::new(),
                agent_id: String::new(),
                app_id: String::new(),
                licenses: None,
                jti: Some(Uuid::new_v4().to_string()),
                iat: now.timestamp(),
                exp: (now + Duration::hours(1)).timestamp(),
            },
        }
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.claims.username = username.into();
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.claims.status = status.into();
        self
    }

    pub fn roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.claims.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_role(mut self, role: impl Into<String>) -> Self {
        self.claims.roles.push(role.into());
        self
    }

    pub fn org_id(mut self, org_id: impl Into<String>) -> Self {
        self.claims.org_id = org_id.into();
        self
    }

    pub fn group_id(mut self, group_id: impl Into<String>) -> Self {
        self.claims.group_id = group_id.into();
        self
    }

    pub fn agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.claims.agent_id = agent_id.into();
        self
    }

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.claims.app_id = app_id.into();
        self
    }

    /// Add one service license. Creates the license map on first use.
    pub fn license(mut self, service: impl Into<String>, tier: LicenseTier) -> Self {
        self.claims
            .licenses
            .get_or_insert_with(BTreeMap::new)
            .insert(service.into(), tier.as_str().to_string());
        self
    }

    /// Add a raw license string, including values outside the known tiers.
    pub fn raw_license(mut self, service: impl Into<String>, tier: impl Into<String>) -> Self {
        self.claims
            .licenses
            .get_or_insert_with(BTreeMap::new)
            .insert(service.into(), tier.into());
        self
    }

    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.claims.exp = (Utc::now() + duration).timestamp();
        self
    }

    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.claims.exp = timestamp;
        self
    }

    pub fn jti(mut self, jti: impl Into<String>) -> Self {
        self.claims.jti = Some(jti.into());
        self
    }

    pub fn build(self) -> Claims {
        self.claims
    }
}
