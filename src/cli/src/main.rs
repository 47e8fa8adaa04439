//! Hydra Gate CLI - issue, inspect and dry-run access tokens against the
//! authorization pipeline.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hydra_gate::auth::TokenValidator;
use hydra_gate::config::AuthConfig;

use commands::{check, config, routes, token};
use output::OutputFormat;

/// Hydra Gate - request authorization toolkit
#[derive(Parser)]
#[command(
    name = "hydra-gate",
    version,
    about = "Hydra Gate - request authorization toolkit",
    long_about = "Issue and inspect access tokens and dry-run endpoint policies against the \
                  license and universe-role gates.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// Shared HMAC secret used to sign and verify tokens
    #[arg(long, global = true, env = "HYDRA__AUTH__JWT_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// JWT algorithm (HS256, HS384, HS512)
    #[arg(long, global = true, env = "HYDRA__AUTH__JWT_ALGORITHM")]
    algorithm: Option<String>,

    /// Service name the license gate evaluates
    #[arg(long, global = true, env = "HYDRA__SERVICE__NAME")]
    service: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Token operations
    #[command(subcommand)]
    Token(token::TokenCommands),

    /// Dry-run an endpoint policy against a token
    Check(check::CheckArgs),

    /// List the reference server's endpoint policies
    Routes,

    /// Configuration management
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

/// Settings resolved from flags, environment and the config file.
pub struct Settings {
    pub secret: Option<String>,
    pub algorithm: String,
    pub service: Option<String>,
}

impl Settings {
    fn resolve(cli: &Cli) -> Result<Self> {
        let file = config::load_config()?;
        Ok(Self {
            secret: cli
                .secret
                .clone()
                .or_else(|| file.get(config::KEY_JWT_SECRET).map(str::to_string)),
            algorithm: cli
                .algorithm
                .clone()
                .or_else(|| file.get(config::KEY_JWT_ALGORITHM).map(str::to_string))
                .unwrap_or_else(|| "HS256".to_string()),
            service: cli
                .service
                .clone()
                .or_else(|| file.get(config::KEY_SERVICE).map(str::to_string)),
        })
    }

    /// Build a validator from the resolved secret and algorithm.
    pub fn validator(&self) -> Result<TokenValidator> {
        let secret = self.secret.clone().context(
            "No signing secret. Pass --secret, set HYDRA__AUTH__JWT_SECRET, \
             or run `hydra-gate config set jwt-secret <value>`",
        )?;

        let validator = TokenValidator::new(&AuthConfig {
            jwt_secret: Some(secret),
            jwt_algorithm: self.algorithm.clone(),
            ..AuthConfig::default()
        })?;
        Ok(validator)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let format = cli.output;

    let result = Settings::resolve(&cli).and_then(|settings| match cli.command {
        Commands::Token(cmd) => token::execute(cmd, &settings, format),
        Commands::Check(args) => check::execute(args, &settings, format).map(|allowed| {
            if !allowed {
                std::process::exit(2);
            }
        }),
        Commands::Routes => routes::execute(format),
        Commands::Config(cmd) => config::execute(cmd, format),
    });

    if let Err(e) = result {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
