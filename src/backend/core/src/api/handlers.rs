//! API request handlers.
//!
//! Handlers run only after the authorization layer allowed the request, so
//! they read identity from [`CurrentUser`] / [`AuthClaims`] and never parse
//! tokens themselves.

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use super::{ApiResponse, AppState};
use crate::error::AuthzError;
use crate::middleware::{AuthClaims, CurrentUser};
use crate::rbac::{ResourceOwner, RoleScope};

// ═══════════════════════════════════════════════════════════════════════════════
// Health & Metrics
// ═══════════════════════════════════════════════════════════════════════════════

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339()
    }))
}

pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            handle.render(),
        ),
        None => (
            StatusCode::NOT_FOUND,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            "metrics disabled".to_string(),
        ),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Token Handlers
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenResponse {
    pub valid: bool,
    pub user: crate::auth::RequestContext,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Echo the identity the pipeline built for this token.
pub async fn verify_token(
    CurrentUser(ctx): CurrentUser,
    AuthClaims(claims): AuthClaims,
) -> impl IntoResponse {
    Json(ApiResponse::success(VerifyTokenResponse {
        valid: true,
        user: ctx,
        expires_at: claims.expires_at(),
    }))
}

/// Revoke the presented token until it would have expired anyway.
pub async fn revoke_token(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
) -> Result<impl IntoResponse, AuthzError> {
    let jti = claims
        .jti
        .ok_or_else(|| AuthzError::unauthorized("token cannot be revoked: missing jti"))?;

    state.pipeline.validator().revoke(jti.clone(), claims.exp);
    info!(user_id = %claims.sub, jti = %jti, "Token revoked");

    Ok(Json(ApiResponse::success(serde_json::json!({ "revoked": jti }))))
}

pub async fn my_permissions(scope: RoleScope) -> impl IntoResponse {
    Json(ApiResponse::success(scope))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Model Handlers
// ═══════════════════════════════════════════════════════════════════════════════

/// Stored model, with the owner fields the scope filter inspects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub id: Uuid,
    pub name: String,
    pub org_id: String,
    pub group_id: String,
    pub created_by: String,
    pub agent_id: String,
    pub created_at: DateTime<Utc>,
}

impl ModelRecord {
    fn owner(&self) -> ResourceOwner<'_> {
        ResourceOwner {
            org_id: &self.org_id,
            group_id: &self.group_id,
            user_id: &self.created_by,
            agent_id: &self.agent_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateModelRequest {
    pub name: String,
}

pub async fn list_models(State(state): State<AppState>, scope: RoleScope) -> impl IntoResponse {
    let mut models: Vec<ModelRecord> = state
        .models
        .iter()
        .filter(|entry| scope.filter.matches(&entry.owner()))
        .map(|entry| entry.value().clone())
        .collect();
    models.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    Json(ApiResponse::success(models))
}

pub async fn create_model(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    scope: RoleScope,
    Json(req): Json<CreateModelRequest>,
) -> impl IntoResponse {
    if !scope.permissions.allow_create {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<ModelRecord>::error(
                "PERMISSION_DENIED",
                "Your role does not allow creating models",
            )),
        );
    }
    if req.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<ModelRecord>::error(
                "VALIDATION_ERROR",
                "Model name cannot be empty",
            )),
        );
    }

    let record = ModelRecord {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        org_id: ctx.org_id,
        group_id: ctx.group_id,
        created_by: ctx.user_id,
        agent_id: ctx.agent_id,
        created_at: Utc::now(),
    };
    state.models.insert(record.id, record.clone());

    (StatusCode::CREATED, Json(ApiResponse::success(record)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Universe Handlers
// ═══════════════════════════════════════════════════════════════════════════════

/// Organizations that own at least one model. Honors the organization
/// override header, so a scoped universe caller sees only that organization.
pub async fn list_organizations(
    State(state): State<AppState>,
    scope: RoleScope,
) -> impl IntoResponse {
    let mut orgs: Vec<String> = state
        .models
        .iter()
        .filter(|entry| scope.filter.matches(&entry.owner()))
        .map(|entry| entry.org_id.clone())
        .collect();
    orgs.sort();
    orgs.dedup();

    Json(ApiResponse::success(orgs))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub total_models: usize,
    pub models_by_organization: BTreeMap<String, usize>,
    pub requested_by: String,
}

/// System-wide counts. Always computed over every organization.
pub async fn statistics(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> impl IntoResponse {
    let mut by_org = BTreeMap::new();
    for entry in state.models.iter() {
        *by_org.entry(entry.org_id.clone()).or_insert(0) += 1;
    }

    Json(ApiResponse::success(StatisticsResponse {
        total_models: state.models.len(),
        models_by_organization: by_org,
        requested_by: ctx.user_id,
    }))
}
