//! Authorization pipeline.
//!
//! Stage order is fixed: token validation, context building, license gate,
//! universe role gate, then the organization scope override for the handler.
//! License runs before role so an unlicensed organization is rejected before
//! any role detail is evaluated. Every stage short-circuits on denial, and an
//! endpoint that declares nothing for a gate behaves as if the gate were not
//! in the pipeline.
//!
//! Decisions are pure functions of the endpoint policy and the immutable
//! per-request identity; the pipeline holds no per-request state.

use axum::http::HeaderMap;
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info, warn, Level};

use crate::auth::{
    is_valid_organization_id, Claims, RequestContext, TokenValidator,
    ORGANIZATION_OVERRIDE_HEADER,
};
use crate::config::Config;
use crate::error::{AuthzError, Result};
use crate::license::LicenseGate;
use crate::policy::EndpointPolicy;
use crate::rbac::UniverseRoleGate;

/// Outcome of a successful authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedRequest {
    /// Validated claims; `None` on public endpoints.
    pub claims: Option<Claims>,
    /// Identity the gates evaluated.
    pub identity: RequestContext,
    /// Identity handlers see, after any organization override.
    pub context: RequestContext,
}

/// Ordered composition of the validator and the two gates.
#[derive(Debug, Clone)]
pub struct AuthorizationPipeline {
    validator: Arc<TokenValidator>,
    license_gate: LicenseGate,
    role_gate: UniverseRoleGate,
}

impl AuthorizationPipeline {
    pub fn new(validator: Arc<TokenValidator>, license_gate: LicenseGate) -> Self {
        Self {
            validator,
            license_gate,
            role_gate: UniverseRoleGate::new(),
        }
    }

    /// Build the validator and gates from application configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let validator = TokenValidator::new(&config.auth)?;
        let license_gate = LicenseGate::new(config.service.name.clone());
        Ok(Self::new(Arc::new(validator), license_gate))
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    pub fn license_gate(&self) -> &LicenseGate {
        &self.license_gate
    }

    /// Run the full pipeline for one request.
    pub fn authorize(&self, headers: &HeaderMap, policy: &EndpointPolicy) -> Result<AuthorizedRequest> {
        let outcome = self.evaluate(headers, policy);
        record_decision(&outcome);
        outcome
    }

    /// Run the gates against already-validated claims.
    ///
    /// `None` means no authenticated identity. Returns the identity the gates
    /// evaluated.
    pub fn check_gates(
        &self,
        claims: Option<&Claims>,
        policy: &EndpointPolicy,
    ) -> Result<RequestContext> {
        let identity = claims.map(RequestContext::from_claims);

        self.license_gate
            .check(policy.required_license, identity.as_ref())?;
        self.role_gate
            .check(policy.requires_universe_role, identity.as_ref())?;

        Ok(identity.unwrap_or_default())
    }

    fn evaluate(&self, headers: &HeaderMap, policy: &EndpointPolicy) -> Result<AuthorizedRequest> {
        let claims = if policy.public {
            None
        } else {
            Some(self.validator.authenticate(headers)?)
        };

        let identity = self.check_gates(claims.as_ref(), policy)?;
        let context = scope_override(&identity, headers, policy);

        Ok(AuthorizedRequest {
            claims,
            identity,
            context,
        })
    }
}

/// Handler-visible context for a universe caller naming an organization.
///
/// Gates never see the result; they always evaluate the token identity.
fn scope_override(
    identity: &RequestContext,
    headers: &HeaderMap,
    policy: &EndpointPolicy,
) -> RequestContext {
    if !identity.has_universe_role() || policy.universe_scope_only {
        return identity.clone();
    }

    let Some(raw) = headers.get(ORGANIZATION_OVERRIDE_HEADER) else {
        return identity.clone();
    };

    match raw.to_str() {
        Ok(org_id) if is_valid_organization_id(org_id) => {
            info!(
                user_id = %identity.user_id,
                original_org_id = %identity.org_id,
                override_org_id = %org_id,
                "Universe caller acting as organization owner"
            );
            identity.scoped_to_organization(org_id)
        }
        _ => {
            warn!(
                user_id = %identity.user_id,
                token_org_id = %identity.org_id,
                "Invalid organization override header, using token organization"
            );
            identity.clone()
        }
    }
}

fn record_decision(outcome: &Result<AuthorizedRequest>) {
    match outcome {
        Ok(_) => {
            counter!("authz_decisions_total", "outcome" => "allow", "code" => "OK").increment(1);
        }
        Err(err) => {
            counter!("authz_decisions_total", "outcome" => "deny", "code" => err.code())
                .increment(1);

            match denial_log_level(err) {
                Some(level) if level == Level::WARN => {
                    warn!(code = err.code(), reason = %err, "Request denied by configuration fault")
                }
                Some(_) => debug!(code = err.code(), reason = %err, "Request denied"),
                None => {}
            }
        }
    }
}

/// Level at which a denial is logged here. License configuration faults are
/// already logged by the license gate with service and tier detail.
fn denial_log_level(err: &AuthzError) -> Option<Level> {
    match err {
        AuthzError::ServiceIdentityMisconfigured
        | AuthzError::InvalidLicenseConfiguration { .. } => None,
        e if e.is_configuration_fault() => Some(Level::WARN),
        _ => Some(Level::DEBUG),
    }
}
