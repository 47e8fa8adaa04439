//! Dry-run an endpoint policy against a token without a running server.

use anyhow::{bail, Result};
use clap::Args;
use hydra_gate::api::default_policies;
use hydra_gate::license::{LicenseGate, LicenseTier};
use hydra_gate::pipeline::AuthorizationPipeline;
use hydra_gate::policy::EndpointPolicy;
use serde::Serialize;
use std::sync::Arc;

use crate::output::{self, OutputFormat};
use crate::Settings;

#[derive(Args)]
pub struct CheckArgs {
    /// Encoded token
    pub token: String,

    /// Minimum license tier the endpoint requires
    #[arg(long, value_parser = parse_tier)]
    pub license: Option<LicenseTier>,

    /// Require a universe-level role
    #[arg(long)]
    pub universe: bool,

    /// Use the reference server's policy for a route instead, e.g.
    /// --route "POST /api/v1/models"
    #[arg(long, conflicts_with_all = ["license", "universe"])]
    pub route: Option<String>,
}

fn parse_tier(s: &str) -> Result<LicenseTier, String> {
    s.parse::<LicenseTier>().map_err(|e| e.to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Decision {
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    policy: EndpointPolicy,
    service: Option<String>,
}

fn route_policy(route: &str) -> Result<EndpointPolicy> {
    let Some((method, path)) = route.trim().split_once(' ') else {
        bail!("expected \"METHOD PATH\", got '{}'", route);
    };

    let registry = default_policies();
    let found = registry
        .routes()
        .into_iter()
        .find(|(key, _)| key.method.as_str().eq_ignore_ascii_case(method) && key.path == path.trim())
        .map(|(_, policy)| policy.clone());

    match found {
        Some(policy) => Ok(policy),
        None => bail!("No policy registered for {} (see `hydra-gate routes`)", route),
    }
}

/// Returns whether the request would be allowed.
pub fn execute(args: CheckArgs, settings: &Settings, format: OutputFormat) -> Result<bool> {
    let policy = match &args.route {
        Some(route) => route_policy(route)?,
        None => {
            let mut policy = EndpointPolicy::authenticated();
            if let Some(tier) = args.license {
                policy = policy.require_license(tier);
            }
            if args.universe {
                policy = policy.require_universe_role();
            }
            policy
        }
    };

    let pipeline = AuthorizationPipeline::new(
        Arc::new(settings.validator()?),
        LicenseGate::new(settings.service.clone()),
    );

    let outcome = pipeline
        .validator()
        .validate(&args.token)
        .and_then(|claims| pipeline.check_gates(Some(&claims), &policy));

    let decision = match &outcome {
        Ok(_) => Decision {
            allowed: true,
            status: None,
            code: None,
            message: None,
            policy,
            service: pipeline.license_gate().service_name().map(str::to_string),
        },
        Err(err) => Decision {
            allowed: false,
            status: Some(err.status_code().as_u16()),
            code: Some(err.code()),
            message: Some(err.to_string()),
            policy,
            service: pipeline.license_gate().service_name().map(str::to_string),
        },
    };

    match format {
        OutputFormat::Table => match &outcome {
            Ok(ctx) => output::print_success(&format!("allowed for user {}", ctx.user_id)),
            Err(err) => output::print_denied(err.code(), &err.to_string()),
        },
        _ => output::print_item(&decision, format)?,
    }

    Ok(decision.allowed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_policy_lookup() {
        let policy = route_policy("post /api/v1/models").unwrap();
        assert_eq!(policy.required_license, Some(LicenseTier::Full));

        let policy = route_policy("GET /api/v1/statistics").unwrap();
        assert!(policy.requires_universe_role);

        assert!(route_policy("GET /nowhere").is_err());
        assert!(route_policy("/api/v1/models").is_err());
    }
}
