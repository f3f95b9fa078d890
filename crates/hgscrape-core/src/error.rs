// ── Core error types ──
//
// Errors surfaced by hgscrape-core. The poller treats every one of them as
// "this tick's fetch failed"; the binary uses the variant to pick a
// diagnostic. `From<hgscrape_api::Error>` folds transport-layer detail
// into these domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to router at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Router request timed out")]
    Timeout,

    // ── Fetch errors ─────────────────────────────────────────────────
    #[error("Page fetch failed: {message}")]
    FetchFailed {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hgscrape_api::Error> for CoreError {
    fn from(err: hgscrape_api::Error) -> Self {
        match err {
            hgscrape_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            hgscrape_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::FetchFailed {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            hgscrape_api::Error::Status { page, status } => CoreError::FetchFailed {
                message: format!("{page} returned HTTP {status}"),
                status: Some(status),
            },
            hgscrape_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            hgscrape_api::Error::ClientBuild(message) => CoreError::Config { message },
        }
    }
}
