//! CLI command handlers.

pub mod config;
pub mod provision;
pub mod server;
pub mod workspace;
