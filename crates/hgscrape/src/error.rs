//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use std::net::SocketAddr;

use miette::Diagnostic;
use thiserror::Error;

use hgscrape_config::ConfigError;
use hgscrape_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Router ───────────────────────────────────────────────────────
    #[error("Could not connect to router at {url}")]
    #[diagnostic(
        code(hgscrape::connection_failed),
        help(
            "Check that the router is reachable from this host.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Router rejected the login: {message}")]
    #[diagnostic(
        code(hgscrape::auth_failed),
        help("Verify ROUTER_USERNAME and ROUTER_PASSWORD.")
    )]
    AuthFailed { message: String },

    #[error("Router request timed out")]
    #[diagnostic(
        code(hgscrape::timeout),
        help("Increase REQUEST_TIMEOUT_SECONDS or check router responsiveness.")
    )]
    Timeout,

    #[error("Could not read counters from router: {message}")]
    #[diagnostic(code(hgscrape::fetch_failed))]
    FetchFailed { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("{env} is not set")]
    #[diagnostic(
        code(hgscrape::missing_setting),
        help("Set {env} in the environment or `{key}` in the config file.")
    )]
    MissingSetting { key: &'static str, env: &'static str },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hgscrape::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(hgscrape::config))]
    Config(Box<figment::Error>),

    // ── Exporter ─────────────────────────────────────────────────────
    #[error("Could not start the metrics endpoint on {addr}")]
    #[diagnostic(
        code(hgscrape::exporter),
        help(
            "Is another process already listening on that port?\n\
             Change EXPORTER_ADDRESS or EXPORTER_PORT.\n\
             Reason: {reason}"
        )
    )]
    Exporter { addr: SocketAddr, reason: String },

    #[error("Poll task failed: {0}")]
    #[diagnostic(code(hgscrape::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Timeout => exit_code::TIMEOUT,
            Self::MissingSetting { .. } | Self::Validation { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            Self::FetchFailed { .. } | Self::Exporter { .. } | Self::Internal(_) => {
                exit_code::GENERAL
            }
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { key, env } => CliError::MissingSetting { key, env },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Figment(err) => CliError::Config(err),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::FetchFailed { message, .. } => CliError::FetchFailed { message },
            CoreError::Config { message } => CliError::Validation {
                field: "router".into(),
                reason: message,
            },
        }
    }
}
