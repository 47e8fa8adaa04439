//! HTTP-level tests for the reference router.
//!
//! Tests cover:
//! - Public endpoints reachable without a token
//! - 401 / 403 JSON bodies for every denial code
//! - License and universe gates on the sample routes
//! - Organization override for universe callers
//! - Token revocation through the API

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use hydra_gate::api::{build_router, AppState};
use hydra_gate::auth::{Claims, TokenValidator};
use hydra_gate::license::{LicenseGate, LicenseTier};
use hydra_gate::pipeline::AuthorizationPipeline;
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "api-tests-secret";
const ORG_A: &str = "507f1f77bcf86cd799439011";
const ORG_B: &str = "507f191e810c19729de860ea";

// ============================================================================
// Helpers
// ============================================================================

struct TestApp {
    router: Router,
    pipeline: Arc<AuthorizationPipeline>,
}

impl TestApp {
    fn new(service: Option<&str>) -> Self {
        let validator = Arc::new(TokenValidator::from_secret(SECRET).unwrap());
        let pipeline = Arc::new(AuthorizationPipeline::new(
            validator,
            LicenseGate::new(service.map(str::to_string)),
        ));
        let router = build_router(AppState::new(pipeline.clone()));
        Self { router, pipeline }
    }

    fn token(&self, claims: &Claims) -> String {
        self.pipeline.validator().issue(claims).unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, None)).await
    }
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn member(user: &str, role: &str, org: &str, aiwm: LicenseTier) -> Claims {
    Claims::builder(user)
        .username(user)
        .roles([role])
        .org_id(org)
        .license("aiwm", aiwm)
        .build()
}

fn universe_admin() -> Claims {
    Claims::builder("root")
        .username("root")
        .roles(["universe.owner"])
        .org_id(ORG_B)
        .build()
}

fn assert_denied(status: StatusCode, body: &Value, expected: StatusCode, code: &str) {
    assert_eq!(status, expected, "body: {body}");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], code);
}

// ============================================================================
// Public Endpoints
// ============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new(Some("aiwm"));
    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_metrics_route_without_recorder() {
    let app = TestApp::new(Some("aiwm"));
    let response = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/metrics", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_endpoint_ignores_garbage_token() {
    let app = TestApp::new(Some("aiwm"));
    let (status, _) = app.get("/health", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Token Validation
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_401() {
    let app = TestApp::new(Some("aiwm"));
    let (status, body) = app.get("/api/v1/models", None).await;

    assert_denied(status, &body, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_non_bearer_scheme_is_401() {
    let app = TestApp::new(Some("aiwm"));
    let token = app.token(&member("u1", "organization.viewer", ORG_A, LicenseTier::Full));
    let req = Request::builder()
        .uri("/auth/verify-token")
        .header(header::AUTHORIZATION, format!("Basic {}", token))
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send(req).await;
    assert_denied(status, &body, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_expired_token_is_401() {
    let app = TestApp::new(Some("aiwm"));
    let claims = Claims::builder("u1")
        .license("aiwm", LicenseTier::Full)
        .expires_at((Utc::now() - Duration::hours(1)).timestamp())
        .build();

    let (status, body) = app.get("/api/v1/models", Some(&app.token(&claims))).await;

    assert_denied(status, &body, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
    assert_eq!(body["error"]["message"], "Token has expired");
}

#[tokio::test]
async fn test_foreign_signature_is_401() {
    let app = TestApp::new(Some("aiwm"));
    let other = TokenValidator::from_secret("some-other-secret").unwrap();
    let token = other
        .issue(&member("u1", "organization.viewer", ORG_A, LicenseTier::Full))
        .unwrap();

    let (status, body) = app.get("/auth/verify-token", Some(&token)).await;
    assert_denied(status, &body, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_verify_token_echoes_context() {
    let app = TestApp::new(Some("aiwm"));
    let claims = member("alice", "organization.editor", ORG_A, LicenseTier::Limited);

    let (status, body) = app
        .get("/auth/verify-token", Some(&app.token(&claims)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["user"]["userId"], "alice");
    assert_eq!(body["data"]["user"]["orgId"], ORG_A);
    assert_eq!(body["data"]["user"]["roles"], json!(["organization.editor"]));
    assert_eq!(body["data"]["user"]["licenses"]["aiwm"], "limited");
    assert!(body["data"]["expiresAt"].is_string());
}

#[tokio::test]
async fn test_revoked_token_is_rejected() {
    let app = TestApp::new(Some("aiwm"));
    let token = app.token(&member("u1", "organization.viewer", ORG_A, LicenseTier::Full));

    let (status, _) = app
        .send(request(Method::POST, "/auth/revoke", Some(&token), None))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/auth/verify-token", Some(&token)).await;
    assert_denied(status, &body, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
    assert_eq!(body["error"]["message"], "Token has been revoked");
}

// ============================================================================
// License Gate
// ============================================================================

#[tokio::test]
async fn test_limited_license_reads_but_cannot_create() {
    let app = TestApp::new(Some("aiwm"));
    let token = app.token(&member("u1", "organization.editor", ORG_A, LicenseTier::Limited));

    let (status, _) = app.get("/api/v1/models", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(request(
            Method::POST,
            "/api/v1/models",
            Some(&token),
            Some(json!({ "name": "gpt-mini" })),
        ))
        .await;

    assert_denied(status, &body, StatusCode::FORBIDDEN, "INSUFFICIENT_LICENSE");
    assert_eq!(
        body["error"]["message"],
        "This feature requires FULL license for aiwm service. Your organization has LIMITED \
         license. Please contact your administrator to upgrade your license."
    );
}

#[tokio::test]
async fn test_missing_license_defaults_to_disabled() {
    let app = TestApp::new(Some("aiwm"));
    let claims = Claims::builder("u1")
        .roles(["organization.owner"])
        .license("cbm", LicenseTier::Full)
        .build();

    let (status, body) = app.get("/api/v1/models", Some(&app.token(&claims))).await;

    assert_denied(status, &body, StatusCode::FORBIDDEN, "INSUFFICIENT_LICENSE");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Your organization has DISABLED license"));
}

#[tokio::test]
async fn test_unconfigured_service_denies_license_gated_routes() {
    let app = TestApp::new(None);
    let token = app.token(&member("u1", "organization.owner", ORG_A, LicenseTier::Full));

    let (status, body) = app.get("/api/v1/models", Some(&token)).await;
    assert_denied(status, &body, StatusCode::FORBIDDEN, "SERVICE_MISCONFIGURED");

    // Routes without a license requirement are unaffected.
    let (status, _) = app.get("/auth/verify-token", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_tier_in_token_fails_closed() {
    let app = TestApp::new(Some("aiwm"));
    let claims = Claims::builder("u1")
        .roles(["organization.owner"])
        .raw_license("aiwm", "enterprise")
        .build();

    let (status, body) = app.get("/api/v1/models", Some(&app.token(&claims))).await;

    assert_denied(
        status,
        &body,
        StatusCode::FORBIDDEN,
        "INVALID_LICENSE_CONFIGURATION",
    );
    assert_eq!(body["error"]["message"], "Invalid license configuration");
}

// ============================================================================
// Models and Role Scope
// ============================================================================

#[tokio::test]
async fn test_create_and_list_models_by_organization() {
    let app = TestApp::new(Some("aiwm"));
    let editor = app.token(&member("ed", "organization.editor", ORG_A, LicenseTier::Full));
    let viewer_a = app.token(&member("va", "organization.viewer", ORG_A, LicenseTier::Limited));
    let viewer_b = app.token(&member("vb", "organization.viewer", ORG_B, LicenseTier::Limited));

    let (status, body) = app
        .send(request(
            Method::POST,
            "/api/v1/models",
            Some(&editor),
            Some(json!({ "name": "gpt-mini" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["orgId"], ORG_A);
    assert_eq!(body["data"]["createdBy"], "ed");

    let (_, body) = app.get("/api/v1/models", Some(&viewer_a)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/v1/models", Some(&viewer_b)).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_viewer_with_full_license_cannot_create() {
    let app = TestApp::new(Some("aiwm"));
    let token = app.token(&member("v", "organization.viewer", ORG_A, LicenseTier::Full));

    let (status, body) = app
        .send(request(
            Method::POST,
            "/api/v1/models",
            Some(&token),
            Some(json!({ "name": "gpt-mini" })),
        ))
        .await;

    assert_denied(status, &body, StatusCode::FORBIDDEN, "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_my_permissions() {
    let app = TestApp::new(Some("aiwm"));
    let token = app.token(&member("ed", "organization.editor", ORG_A, LicenseTier::Limited));

    let (status, body) = app.get("/api/v1/me/permissions", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "organization.editor");
    assert_eq!(body["data"]["scope"], "organization");
    assert_eq!(body["data"]["permissions"]["allowCreate"], true);
    assert_eq!(body["data"]["permissions"]["allowHardDelete"], false);
    assert_eq!(body["data"]["filter"]["scope"], "organization");
    assert_eq!(body["data"]["filter"]["org_id"], ORG_A);
}

// ============================================================================
// Universe Gate and Organization Override
// ============================================================================

#[tokio::test]
async fn test_universe_route_requires_universe_role() {
    let app = TestApp::new(Some("aiwm"));

    let owner = app.token(&member("o", "organization.owner", ORG_A, LicenseTier::Full));
    let (status, body) = app.get("/api/v1/organizations", Some(&owner)).await;
    assert_denied(status, &body, StatusCode::FORBIDDEN, "UNIVERSE_ROLE_REQUIRED");

    // No licenses needed for a route that declares none.
    let root = app.token(&universe_admin());
    let (status, _) = app.get("/api/v1/organizations", Some(&root)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_universe_caller_acts_as_organization_owner() {
    let app = TestApp::new(Some("aiwm"));
    let root = app.token(&universe_admin());

    let req = Request::builder()
        .uri("/api/v1/me/permissions")
        .header(header::AUTHORIZATION, format!("Bearer {}", root))
        .header("X-Organization-Id", ORG_A)
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "organization.owner");
    assert_eq!(body["data"]["filter"]["org_id"], ORG_A);
}

#[tokio::test]
async fn test_override_still_passes_universe_gate() {
    let app = TestApp::new(Some("aiwm"));
    let root = app.token(&universe_admin());

    let req = Request::builder()
        .uri("/api/v1/organizations")
        .header(header::AUTHORIZATION, format!("Bearer {}", root))
        .header("X-Organization-Id", ORG_A)
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(req).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_statistics_ignore_override() {
    let app = TestApp::new(Some("aiwm"));
    let editor_a = app.token(&member("ea", "organization.editor", ORG_A, LicenseTier::Full));
    let editor_b = app.token(&member("eb", "organization.editor", ORG_B, LicenseTier::Full));

    for token in [&editor_a, &editor_b] {
        let (status, _) = app
            .send(request(
                Method::POST,
                "/api/v1/models",
                Some(token),
                Some(json!({ "name": "m" })),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let root = app.token(&universe_admin());
    let req = Request::builder()
        .uri("/api/v1/statistics")
        .header(header::AUTHORIZATION, format!("Bearer {}", root))
        .header("X-Organization-Id", ORG_A)
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalModels"], 2);
    assert_eq!(body["data"]["requestedBy"], "root");
}
