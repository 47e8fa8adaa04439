//! Bearer token validation.
//!
//! The validator is self-contained: signature, expiry and subject checks run
//! against in-token data and a configured secret, so no database round-trip
//! happens per request. The only shared state is the revocation list, a
//! lock-sharded map consulted by `jti`.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::Utc;
use dashmap::DashMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use metrics::counter;
use std::str::FromStr;
use tracing::debug;

use super::claims::Claims;
use crate::config::AuthConfig;
use crate::error::{AuthzError, Result};

/// Verifies bearer tokens and produces [`Claims`].
pub struct TokenValidator {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    revoked_tokens: DashMap<String, i64>,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("algorithm", &self.algorithm)
            .field("revoked_tokens", &self.revoked_tokens.len())
            .finish_non_exhaustive()
    }
}

impl TokenValidator {
    /// Create a validator from the `auth` configuration section.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let algorithm = Algorithm::from_str(&config.jwt_algorithm).map_err(|_| {
            AuthzError::Internal(format!("Unsupported JWT algorithm: {}", config.jwt_algorithm))
        })?;

        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(AuthzError::Internal(format!(
                "Only HMAC algorithms are supported, got {:?}",
                algorithm
            )));
        }

        let secret = config
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthzError::Internal("JWT secret required for HMAC algorithms".into()))?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_secs;
        validation.set_required_spec_claims(&["exp"]);

        if let Some(ref issuer) = config.issuer {
            validation.set_issuer(&[issuer]);
        }

        if let Some(ref audience) = config.audience {
            validation.set_audience(&[audience]);
        } else {
            validation.validate_aud = false;
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            revoked_tokens: DashMap::new(),
        })
    }

    /// Shorthand for an HS256 validator with default settings.
    pub fn from_secret(secret: impl Into<String>) -> Result<Self> {
        Self::new(&AuthConfig {
            jwt_secret: Some(secret.into()),
            ..AuthConfig::default()
        })
    }

    /// Extract the token from an `Authorization: Bearer <token>` header.
    pub fn extract_bearer(headers: &HeaderMap) -> Result<&str> {
        let value = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AuthzError::unauthorized("missing bearer token"))?;

        match value.split_once(' ') {
            Some((scheme, token))
                if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() =>
            {
                Ok(token.trim())
            }
            _ => Err(AuthzError::unauthorized("missing bearer token")),
        }
    }

    /// Validate the bearer token found in `headers`.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims> {
        let token = Self::extract_bearer(headers)?;
        self.validate(token)
    }

    /// Verify signature and expiry, then enforce a non-empty subject.
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "JWT validation failed");
                AuthzError::from(e)
            })?;

        let claims = token_data.claims;

        if claims.sub.is_empty() {
            debug!("JWT rejected: empty subject");
            return Err(AuthzError::unauthorized("invalid token payload"));
        }

        if let Some(ref jti) = claims.jti {
            if self.revoked_tokens.contains_key(jti) {
                debug!(jti = %jti, "JWT rejected: revoked");
                return Err(AuthzError::unauthorized("Token has been revoked"));
            }
        }

        counter!("auth_success_total", "method" => "jwt").increment(1);

        Ok(claims)
    }

    /// Sign claims into a token with the configured secret.
    pub fn issue(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| AuthzError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Revoke a token by its ID until `expires_at` (unix seconds).
    pub fn revoke(&self, jti: impl Into<String>, expires_at: i64) {
        self.revoked_tokens.insert(jti.into(), expires_at);
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.revoked_tokens.contains_key(jti)
    }

    /// Drop revocations whose tokens have expired anyway. Returns how many
    /// entries were removed.
    pub fn purge_revocations(&self) -> usize {
        let now = Utc::now().timestamp();
        let before = self.revoked_tokens.len();
        self.revoked_tokens.retain(|_, exp| *exp > now);
        before.saturating_sub(self.revoked_tokens.len())
    }
}
