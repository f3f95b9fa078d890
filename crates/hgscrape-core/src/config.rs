// ── Runtime configuration ──
//
// These types describe which router to poll and how to publish what it
// reports. They never touch disk: hgscrape-config resolves files and
// environment variables and hands a finished `ExporterConfig` in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default poll cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
/// Default metric name prefix.
pub const DEFAULT_METRIC_PREFIX: &str = "vodafone";

/// How to reach and log into the router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Base URL of the management interface (e.g., `http://192.168.1.1`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Skip TLS verification (self-signed certificates on https routers).
    pub accept_invalid_certs: bool,
}

impl RouterConfig {
    /// Router config with default timeout and strict TLS.
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }
}

/// Everything the poll loop needs.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub router: RouterConfig,
    /// Time between poll ticks.
    pub poll_interval: Duration,
    /// Enable the WAN wrap multiplier heuristic.
    pub wan_multiplier: bool,
    /// Prefix of every published metric name.
    pub metric_prefix: String,
}

impl ExporterConfig {
    /// Exporter config with default cadence, prefix and WAN tracking on.
    pub fn new(router: RouterConfig) -> Self {
        Self {
            router,
            poll_interval: DEFAULT_POLL_INTERVAL,
            wan_multiplier: true,
            metric_prefix: DEFAULT_METRIC_PREFIX.into(),
        }
    }
}
