//! List the endpoint policies of the reference server.

use anyhow::Result;
use hydra_gate::api::default_policies;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct RouteRow {
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Public")]
    public: bool,
    #[tabled(rename = "License")]
    license: String,
    #[tabled(rename = "Universe")]
    universe: bool,
    #[tabled(rename = "Scope Only")]
    universe_scope_only: bool,
}

pub fn execute(format: OutputFormat) -> Result<()> {
    let registry = default_policies();
    let rows: Vec<RouteRow> = registry
        .routes()
        .into_iter()
        .map(|(key, policy)| RouteRow {
            method: key.method.to_string(),
            path: key.path.clone(),
            public: policy.public,
            license: policy
                .required_license
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
            universe: policy.requires_universe_role,
            universe_scope_only: policy.universe_scope_only,
        })
        .collect();

    output::print_list(&rows, format)
}
