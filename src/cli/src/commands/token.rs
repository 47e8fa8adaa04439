//! Token commands: issue signed tokens and inspect existing ones.

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use clap::{Args, Subcommand};
use hydra_gate::auth::{Claims, RequestContext};
use hydra_gate::license::LicenseTier;
use hydra_gate::rbac::RoleScope;
use serde::Serialize;

use crate::output::{self, OutputFormat};
use crate::Settings;

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Sign a new access token
    Issue(IssueArgs),

    /// Verify a token and show its claims and derived identity
    Inspect {
        /// Encoded token
        token: String,
    },
}

#[derive(Args)]
pub struct IssueArgs {
    /// Subject (user ID)
    #[arg(long)]
    pub sub: String,

    #[arg(long)]
    pub username: Option<String>,

    /// Role, repeatable (e.g. --role organization.viewer)
    #[arg(long = "role")]
    pub roles: Vec<String>,

    #[arg(long)]
    pub org: Option<String>,

    #[arg(long)]
    pub group: Option<String>,

    #[arg(long)]
    pub agent: Option<String>,

    #[arg(long)]
    pub app: Option<String>,

    /// License entry SERVICE=TIER, repeatable (e.g. --license aiwm=limited)
    #[arg(long = "license", value_parser = parse_license)]
    pub licenses: Vec<(String, LicenseTier)>,

    /// License entry with an arbitrary tier string, for exercising
    /// invalid-configuration handling
    #[arg(long = "raw-license", value_parser = parse_pair, hide = true)]
    pub raw_licenses: Vec<(String, String)>,

    /// Lifetime in seconds
    #[arg(long, default_value_t = 3600)]
    pub ttl: i64,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((service, tier)) if !service.is_empty() => {
            Ok((service.to_string(), tier.to_string()))
        }
        _ => Err(format!("expected SERVICE=TIER, got '{}'", s)),
    }
}

fn parse_license(s: &str) -> Result<(String, LicenseTier), String> {
    let (service, tier) = parse_pair(s)?;
    let tier = tier.parse::<LicenseTier>().map_err(|e| e.to_string())?;
    Ok((service, tier))
}

impl IssueArgs {
    fn to_claims(&self) -> Claims {
        let mut builder = Claims::builder(&self.sub)
            .roles(self.roles.iter().cloned())
            .expires_in(Duration::seconds(self.ttl));

        if let Some(username) = &self.username {
            builder = builder.username(username);
        }
        if let Some(org) = &self.org {
            builder = builder.org_id(org);
        }
        if let Some(group) = &self.group {
            builder = builder.group_id(group);
        }
        if let Some(agent) = &self.agent {
            builder = builder.agent_id(agent);
        }
        if let Some(app) = &self.app {
            builder = builder.app_id(app);
        }
        for (service, tier) in &self.licenses {
            builder = builder.license(service, *tier);
        }
        for (service, tier) in &self.raw_licenses {
            builder = builder.raw_license(service, tier);
        }

        builder.build()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IssuedToken {
    token: String,
    jti: Option<String>,
    expires_at: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Inspection {
    claims: Claims,
    context: RequestContext,
    role_scope: RoleScope,
}

fn format_timestamp(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

pub fn execute(cmd: TokenCommands, settings: &Settings, format: OutputFormat) -> Result<()> {
    let validator = settings.validator()?;

    match cmd {
        TokenCommands::Issue(args) => {
            let claims = args.to_claims();
            let token = validator.issue(&claims)?;

            match format {
                // Bare token so the output can be captured by scripts.
                OutputFormat::Table => println!("{}", token),
                _ => output::print_item(
                    &IssuedToken {
                        token,
                        jti: claims.jti.clone(),
                        expires_at: claims.expires_at().map(|dt| dt.to_rfc3339()),
                    },
                    format,
                )?,
            }
        }

        TokenCommands::Inspect { token } => {
            let claims = validator.validate(&token)?;
            let context = RequestContext::from_claims(&claims);
            let role_scope = RoleScope::resolve(&context);

            match format {
                OutputFormat::Table => {
                    output::print_header(&format!("Token: {}", claims.sub));
                    output::print_detail("Username", or_dash(&claims.username));
                    output::print_detail("Status", or_dash(&claims.status));
                    output::print_detail("Roles", or_dash(&claims.roles.join(", ")));
                    output::print_detail("Organization", or_dash(&claims.org_id));
                    output::print_detail("Group", or_dash(&claims.group_id));
                    output::print_detail("Agent", or_dash(&claims.agent_id));
                    output::print_detail("App", or_dash(&claims.app_id));

                    let licenses = context
                        .licenses
                        .iter()
                        .map(|(service, tier)| format!("{}={}", service, tier))
                        .collect::<Vec<_>>()
                        .join(", ");
                    output::print_detail("Licenses", or_dash(&licenses));
                    output::print_detail("Issued", &format_timestamp(claims.iat));
                    output::print_detail("Expires", &format_timestamp(claims.exp));
                    output::print_detail("Token ID", claims.jti.as_deref().unwrap_or("-"));

                    output::print_header("Derived Access");
                    output::print_detail(
                        "Universe",
                        if context.has_universe_role() { "yes" } else { "no" },
                    );
                    output::print_detail(
                        "Highest Role",
                        &role_scope
                            .role
                            .map(|r| r.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    );
                    output::print_detail("Scope", &format!("{:?}", role_scope.scope).to_lowercase());
                    output::print_detail("Filter", &format!("{:?}", role_scope.filter));
                }
                _ => output::print_item(
                    &Inspection {
                        claims,
                        context,
                        role_scope,
                    },
                    format,
                )?,
            }
        }
    }

    Ok(())
}
