use thiserror::Error;

/// Top-level error type for the `hgscrape-api` crate.
///
/// Covers every way a page fetch can fail: the login handshake, the
/// HTTP transport, and non-success answers from the router.
/// `hgscrape-core` folds all of these into a single "fetch failed" outcome.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login handshake failed (token request or credential submission).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, body decode).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Router ──────────────────────────────────────────────────────
    /// The router answered a page request with a non-success status.
    #[error("Router returned HTTP {status} for {page}")]
    Status { page: String, status: u16 },
}
