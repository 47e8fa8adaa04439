//! Per-endpoint authorization metadata.
//!
//! Policies are plain values attached to a route when it is registered and
//! looked up by route identity (method + route template) at request time.
//! An endpoint without a registered policy gets [`EndpointPolicy::default`]:
//! authentication required, no license or role gate.

use axum::http::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::license::LicenseTier;

// ═══════════════════════════════════════════════════════════════════════════════
// Endpoint Policy
// ═══════════════════════════════════════════════════════════════════════════════

/// Declared requirements of one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointPolicy {
    /// Skip token validation entirely; handlers see an empty context.
    #[serde(default)]
    pub public: bool,

    /// Minimum license tier for the current service. `None` skips the gate.
    #[serde(default)]
    pub required_license: Option<LicenseTier>,

    /// Require a `universe.` role. `false` skips the gate.
    #[serde(default)]
    pub requires_universe_role: bool,

    /// Ignore the organization override header for universe callers.
    #[serde(default)]
    pub universe_scope_only: bool,
}

impl EndpointPolicy {
    /// Authentication only.
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// No authentication.
    pub fn public() -> Self {
        Self {
            public: true,
            ..Self::default()
        }
    }

    pub fn require_license(mut self, tier: LicenseTier) -> Self {
        self.required_license = Some(tier);
        self
    }

    pub fn require_universe_role(mut self) -> Self {
        self.requires_universe_role = true;
        self
    }

    pub fn universe_scope_only(mut self) -> Self {
        self.universe_scope_only = true;
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Route identity: HTTP method plus the route template (`/models/:id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub method: Method,
    pub path: String,
}

impl RouteKey {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Read-only table of endpoint policies, filled at router construction.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: HashMap<RouteKey, EndpointPolicy>,
    fallback: EndpointPolicy,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a policy. A later registration for the same route replaces
    /// the earlier one.
    pub fn register(
        &mut self,
        method: Method,
        path: impl Into<String>,
        policy: EndpointPolicy,
    ) -> &mut Self {
        self.policies.insert(RouteKey::new(method, path), policy);
        self
    }

    /// Builder-style [`PolicyRegistry::register`].
    pub fn with(mut self, method: Method, path: impl Into<String>, policy: EndpointPolicy) -> Self {
        self.register(method, path, policy);
        self
    }

    /// Policy for a route, or the fallback for unregistered routes.
    pub fn resolve(&self, method: &Method, path: &str) -> &EndpointPolicy {
        self.get(method, path).unwrap_or(&self.fallback)
    }

    /// Registered policy for a route, without fallback.
    pub fn get(&self, method: &Method, path: &str) -> Option<&EndpointPolicy> {
        self.policies.get(&RouteKey::new(method.clone(), path))
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Registered routes, sorted for stable output.
    pub fn routes(&self) -> Vec<(&RouteKey, &EndpointPolicy)> {
        let mut routes: Vec<_> = self.policies.iter().collect();
        routes.sort_by(|a, b| {
            a.0.path
                .cmp(&b.0.path)
                .then_with(|| a.0.method.as_str().cmp(b.0.method.as_str()))
        });
        routes
    }
}
