//! Startup configuration.
//!
//! Every knob is resolved exactly once, from flags with environment
//! fallbacks, and passed down explicitly. Nothing re-probes the environment
//! at request time.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Deployment mode governing store fallback and cookie transport security.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DeploymentMode {
    /// Local development and tests; the file store is an allowed fallback.
    Development,
    /// Production; requires a bound database and secure cookies by default.
    Production,
}

/// Application configuration, parsed from flags and the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "backend", about = "Per-user revenue ledger service")]
pub struct AppConfig {
    /// Deployment mode.
    #[arg(long, env = "LEDGER_MODE", value_enum, default_value = "development")]
    pub mode: DeploymentMode,

    /// SQLite database URL. When set, selects the relational store.
    #[arg(long, env = "LEDGER_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Backing file for the development file store.
    #[arg(long, env = "LEDGER_DATA_PATH", default_value = ".database/data.json")]
    pub data_path: PathBuf,

    /// Address the HTTP server binds to.
    #[arg(long, env = "LEDGER_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// Override the `Secure` attribute on session cookies.
    #[arg(long, env = "LEDGER_COOKIE_SECURE")]
    pub cookie_secure: Option<bool>,
}

impl AppConfig {
    /// Whether session cookies carry the `Secure` attribute.
    ///
    /// Defaults to secure exactly in production; the override exists for
    /// TLS-terminating proxies in front of development deployments.
    pub fn session_secure(&self) -> bool {
        self.cookie_secure
            .unwrap_or(self.mode == DeploymentMode::Production)
    }
}
