//! Reference HTTP surface for Hydra Gate.
//!
//! Every route is registered together with its [`EndpointPolicy`] and the
//! whole router sits behind one [`AuthorizationLayer`] applied as a route
//! layer. Routes:
//!
//! | Method | Path                      | Policy                                   |
//! |--------|---------------------------|------------------------------------------|
//! | GET    | `/health`                 | public                                   |
//! | GET    | `/metrics`                | public                                   |
//! | GET    | `/auth/verify-token`      | authenticated                            |
//! | POST   | `/auth/revoke`            | authenticated                            |
//! | GET    | `/api/v1/me/permissions`  | authenticated                            |
//! | GET    | `/api/v1/models`          | `limited` license                        |
//! | POST   | `/api/v1/models`          | `full` license                           |
//! | GET    | `/api/v1/organizations`   | universe role                            |
//! | GET    | `/api/v1/statistics`      | universe role, organization header ignored |

mod handlers;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use dashmap::DashMap;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::license::LicenseTier;
use crate::middleware::AuthorizationLayer;
use crate::pipeline::AuthorizationPipeline;
use crate::policy::{EndpointPolicy, PolicyRegistry};

pub use handlers::{CreateModelRequest, ModelRecord};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AuthorizationPipeline>,
    pub metrics: Option<PrometheusHandle>,
    pub models: Arc<DashMap<Uuid, ModelRecord>>,
}

impl AppState {
    pub fn new(pipeline: Arc<AuthorizationPipeline>) -> Self {
        Self {
            pipeline,
            metrics: None,
            models: Arc::new(DashMap::new()),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Endpoint policies for every route in [`build_router`].
pub fn default_policies() -> PolicyRegistry {
    PolicyRegistry::new()
        .with(Method::GET, "/health", EndpointPolicy::public())
        .with(Method::GET, "/metrics", EndpointPolicy::public())
        .with(Method::GET, "/auth/verify-token", EndpointPolicy::authenticated())
        .with(Method::POST, "/auth/revoke", EndpointPolicy::authenticated())
        .with(Method::GET, "/api/v1/me/permissions", EndpointPolicy::authenticated())
        .with(
            Method::GET,
            "/api/v1/models",
            EndpointPolicy::authenticated().require_license(LicenseTier::Limited),
        )
        .with(
            Method::POST,
            "/api/v1/models",
            EndpointPolicy::authenticated().require_license(LicenseTier::Full),
        )
        .with(
            Method::GET,
            "/api/v1/organizations",
            EndpointPolicy::authenticated().require_universe_role(),
        )
        .with(
            Method::GET,
            "/api/v1/statistics",
            EndpointPolicy::authenticated()
                .require_universe_role()
                .universe_scope_only(),
        )
}

/// Build the API router with the default policies.
///
/// ```rust,ignore
/// let pipeline = Arc::new(AuthorizationPipeline::from_config(&config)?);
/// let app = build_router(AppState::new(pipeline));
/// ```
pub fn build_router(state: AppState) -> Router {
    build_router_with_policies(state, default_policies())
}

/// Build the API router with a custom policy table.
pub fn build_router_with_policies(state: AppState, policies: PolicyRegistry) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let authorization = AuthorizationLayer::new(state.pipeline.clone(), policies);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::prometheus_metrics))
        .route("/auth/verify-token", get(handlers::verify_token))
        .route("/auth/revoke", post(handlers::revoke_token))
        .route("/api/v1/me/permissions", get(handlers::my_permissions))
        .route(
            "/api/v1/models",
            get(handlers::list_models).post(handlers::create_model),
        )
        .route("/api/v1/organizations", get(handlers::list_organizations))
        .route("/api/v1/statistics", get(handlers::statistics))
        // Route layer so MatchedPath is populated before policy lookup.
        .route_layer(authorization)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}
