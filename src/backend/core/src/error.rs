//! Authorization error taxonomy.
//!
//! Every denial produced by the pipeline is an [`AuthzError`]. Each variant maps
//! to an HTTP status, a stable machine-readable code and a human-readable
//! message. Callers and operators rely on the message text for
//! self-diagnosis, so the templates below are part of the public contract.
//!
//! Configuration faults ([`AuthzError::is_configuration_fault`]) share a status
//! code with caller-caused denials but are logged and counted separately,
//! since they need operator action rather than caller action.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde::Serialize;
use thiserror::Error;

use crate::license::LicenseTier;

/// A specialized Result type for authorization decisions.
pub type Result<T> = std::result::Result<T, AuthzError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Types
// ═══════════════════════════════════════════════════════════════════════════════

/// Terminal, request-scoped authorization failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// Credential missing, malformed, expired, revoked, or without a subject.
    #[error("{0}")]
    Unauthorized(String),

    /// A gate found no identity context; the validator did not run first.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Caller's license tier is below the endpoint's requirement.
    #[error(
        "This feature requires {} license for {service} service. \
         Your organization has {} license. \
         Please contact your administrator to upgrade your license.",
        .required.as_upper(),
        .actual.to_uppercase()
    )]
    InsufficientLicense {
        required: LicenseTier,
        service: String,
        actual: String,
    },

    /// A tier string in the caller's license map is not a known tier.
    #[error("Invalid license configuration")]
    InvalidLicenseConfiguration {
        required: LicenseTier,
        actual: String,
        service: String,
    },

    /// The current service's own name is not configured.
    #[error("Service configuration error: service name not set")]
    ServiceIdentityMisconfigured,

    /// Caller lacks any `universe.` role.
    #[error(
        "This endpoint requires universe-level permissions. \
         Only system administrators can access this resource."
    )]
    UniverseRoleRequired,

    /// The pipeline itself could not be set up (bad key material, etc).
    #[error("Internal authorization error: {0}")]
    Internal(String),
}

impl AuthzError {
    /// Create an `Unauthorized` error with the given reason.
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    /// HTTP status for this denial.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::AuthenticationRequired
            | Self::InsufficientLicense { .. }
            | Self::InvalidLicenseConfiguration { .. }
            | Self::ServiceIdentityMisconfigured
            | Self::UniverseRoleRequired => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::InsufficientLicense { .. } => "INSUFFICIENT_LICENSE",
            Self::InvalidLicenseConfiguration { .. } => "INVALID_LICENSE_CONFIGURATION",
            Self::ServiceIdentityMisconfigured => "SERVICE_MISCONFIGURED",
            Self::UniverseRoleRequired => "UNIVERSE_ROLE_REQUIRED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this denial needs operator action rather than caller action.
    pub fn is_configuration_fault(&self) -> bool {
        matches!(
            self,
            Self::InvalidLicenseConfiguration { .. }
                | Self::ServiceIdentityMisconfigured
                | Self::Internal(_)
        )
    }

    /// Build the JSON error body sent to clients.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            success: false,
            error: ErrorDetail {
                code: self.code(),
                message: self.client_message(),
            },
        }
    }

    /// Internal details never leave the process.
    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "An authorization error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthzError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::unauthorized("Token has expired"),
            ErrorKind::ImmatureSignature => Self::unauthorized("Token is not yet valid"),
            ErrorKind::InvalidSignature => Self::unauthorized("Invalid token signature"),
            ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                Self::unauthorized("Token was not issued for this service")
            }
            ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
                Self::unauthorized("invalid token payload")
            }
            _ => Self::unauthorized("Invalid authentication token"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Response Body
// ═══════════════════════════════════════════════════════════════════════════════

/// Wire shape of a denial.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        counter!(
            "auth_errors_total",
            "error_type" => self.code()
        )
        .increment(1);

        (self.status_code(), Json(self.to_body())).into_response()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
