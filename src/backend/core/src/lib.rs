#![allow(clippy::result_large_err)]
//! # Hydra Gate
//!
//! Request authorization pipeline for the Hydra service mesh.
//!
//! ## Architecture
//!
//! - **Auth**: bearer token validation, claims and the per-request identity context
//! - **License**: per-service license tiers and the license gate
//! - **RBAC**: the `universe.` role gate plus role-scope resolution for handlers
//! - **Policy**: per-endpoint requirements registered with each route
//! - **Pipeline**: ordered composition of validation, license gate and role gate
//! - **Middleware**: Tower layer and Axum extractors wiring the pipeline into a router
//! - **Telemetry**: structured logging, optional OTLP export and Prometheus counters

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod license;
pub mod middleware;
pub mod pipeline;
pub mod policy;
pub mod rbac;
pub mod telemetry;

pub use error::{AuthzError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::auth::{Claims, ClaimsBuilder, RequestContext, TokenValidator};
    pub use crate::config::Config;
    pub use crate::error::{AuthzError, Result};
    pub use crate::license::{LicenseGate, LicenseTier};
    pub use crate::middleware::{AuthClaims, AuthorizationLayer, CurrentUser};
    pub use crate::pipeline::{AuthorizationPipeline, AuthorizedRequest};
    pub use crate::policy::{EndpointPolicy, PolicyRegistry, RouteKey};
    pub use crate::rbac::{
        PermissionSet, PredefinedRole, PredefinedScope, RoleScope, ScopeFilter,
        UniverseRoleGate,
    };
}
