//! License gate.
//!
//! Compares an endpoint's required tier with the caller's tier for *this*
//! service. The service name comes from deployment configuration and is
//! injected at construction, so the same caller can be `full` on one service
//! and `disabled` on another.
//!
//! Check order once a requirement is declared:
//! 1. service name resolvable, else fail closed as a configuration fault
//! 2. identity context present
//! 3. caller tier parses (absent or empty means `disabled`), else fail closed
//!    as a configuration fault
//! 4. caller ordinal >= required ordinal

use tracing::{error, warn};

use super::tier::LicenseTier;
use crate::auth::RequestContext;
use crate::error::{AuthzError, Result};

/// Per-service license gate.
#[derive(Debug, Clone, Default)]
pub struct LicenseGate {
    service_name: Option<String>,
}

impl LicenseGate {
    /// Create a gate for the current service. `None` or a blank name makes
    /// every license-gated endpoint deny.
    pub fn new(service_name: Option<String>) -> Self {
        let service_name = service_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self { service_name }
    }

    /// Gate for a named service.
    pub fn for_service(service_name: impl Into<String>) -> Self {
        Self::new(Some(service_name.into()))
    }

    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    /// Decide for one request. `required = None` skips the gate.
    pub fn check(&self, required: Option<LicenseTier>, ctx: Option<&RequestContext>) -> Result<()> {
        let Some(required) = required else {
            return Ok(());
        };

        let Some(service) = self.service_name.as_deref() else {
            warn!(
                required = %required,
                "Service name not configured, denying license-gated request"
            );
            return Err(AuthzError::ServiceIdentityMisconfigured);
        };

        let ctx = ctx.ok_or(AuthzError::AuthenticationRequired)?;

        // Absent and empty entries both mean no license for this service.
        let actual_raw = ctx
            .license_for(service)
            .filter(|tier| !tier.is_empty())
            .unwrap_or(LicenseTier::Disabled.as_str());

        let actual: LicenseTier = actual_raw.parse().map_err(|_| {
            error!(
                service = %service,
                required = %required,
                actual = %actual_raw,
                user_id = %ctx.user_id,
                org_id = %ctx.org_id,
                "Invalid license tier in token; issuer and service tier sets have drifted"
            );
            AuthzError::InvalidLicenseConfiguration {
                required,
                actual: actual_raw.to_string(),
                service: service.to_string(),
            }
        })?;

        if !actual.satisfies(required) {
            return Err(AuthzError::InsufficientLicense {
                required,
                service: service.to_string(),
                actual: actual.as_str().to_string(),
            });
        }

        Ok(())
    }
}
