//! Tower layer that runs the authorization pipeline in front of handlers.
//!
//! Apply it with `Router::route_layer` so the matched route template is known
//! when the policy is looked up:
//!
//! ```rust,ignore
//! use hydra_gate::{
//!     middleware::AuthorizationLayer,
//!     policy::{EndpointPolicy, PolicyRegistry},
//!     license::LicenseTier,
//! };
//!
//! let registry = PolicyRegistry::new()
//!     .with(Method::POST, "/models", EndpointPolicy::authenticated().require_license(LicenseTier::Full));
//!
//! let app = Router::new()
//!     .route("/models", post(create_model))
//!     .route_layer(AuthorizationLayer::new(pipeline, registry));
//! ```
//!
//! On allow, the validated [`Claims`] (if any) and the handler
//! [`RequestContext`] are inserted into request extensions. On deny, the
//! [`AuthzError`] is rendered as a JSON response and the handler never runs.

use axum::{
    body::Body,
    extract::{FromRequestParts, MatchedPath, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use std::{
    convert::Infallible,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::auth::{Claims, RequestContext};
use crate::error::AuthzError;
use crate::pipeline::AuthorizationPipeline;
use crate::policy::PolicyRegistry;
use crate::rbac::RoleScope;

// ═══════════════════════════════════════════════════════════════════════════════
// Tower Layer and Service
// ═══════════════════════════════════════════════════════════════════════════════

/// Authorization layer for Tower.
#[derive(Clone)]
pub struct AuthorizationLayer {
    pipeline: Arc<AuthorizationPipeline>,
    registry: Arc<PolicyRegistry>,
}

impl AuthorizationLayer {
    pub fn new(pipeline: Arc<AuthorizationPipeline>, registry: PolicyRegistry) -> Self {
        Self {
            pipeline,
            registry: Arc::new(registry),
        }
    }
}

impl<S> Layer<S> for AuthorizationLayer {
    type Service = AuthorizationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthorizationService {
            inner,
            pipeline: self.pipeline.clone(),
            registry: self.registry.clone(),
        }
    }
}

/// Authorization service.
#[derive(Clone)]
pub struct AuthorizationService<S> {
    inner: S,
    pipeline: Arc<AuthorizationPipeline>,
    registry: Arc<PolicyRegistry>,
}

impl<S> Service<Request<Body>> for AuthorizationService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let pipeline = self.pipeline.clone();
        let registry = self.registry.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            // Falls back to the raw path when the layer is not a route layer.
            let route = request
                .extensions()
                .get::<MatchedPath>()
                .map(|p| p.as_str().to_owned())
                .unwrap_or_else(|| request.uri().path().to_owned());

            let policy = registry.resolve(request.method(), &route);

            match pipeline.authorize(request.headers(), policy) {
                Ok(authorized) => {
                    if let Some(claims) = authorized.claims {
                        request.extensions_mut().insert(claims);
                    }
                    request.extensions_mut().insert(authorized.context);
                    inner.call(request).await
                }
                Err(e) => Ok(e.into_response()),
            }
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Axum Extractors
// ═══════════════════════════════════════════════════════════════════════════════

/// Handler-visible identity. Falls back to an empty context, never rejects.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub RequestContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(
            parts
                .extensions
                .get::<RequestContext>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}

/// Raw validated claims. Rejects with 401 on public or unlayered routes.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = AuthzError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthClaims)
            .ok_or_else(|| AuthzError::unauthorized("missing bearer token"))
    }
}

/// Resource-level permissions and ownership filter for the current user.
#[axum::async_trait]
impl<S> FromRequestParts<S> for RoleScope
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(ctx) = CurrentUser::from_request_parts(parts, state).await?;
        Ok(RoleScope::resolve(&ctx))
    }
}
