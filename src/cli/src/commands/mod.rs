//! Subcommand implementations.

pub mod check;
pub mod config;
pub mod routes;
pub mod token;
