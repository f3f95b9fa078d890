// Router HTTP client
//
// Wraps `reqwest::Client` with router-specific URL construction and page
// decoding. The login handshake lives in `auth.rs` as inherent methods so
// this module stays focused on transport mechanics.

use std::fmt;

use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::escape::unescape_js;
use crate::transport::TransportConfig;

/// The pages the exporter reads traffic counters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterPage {
    /// WAN status page; carries the WAN IP connection byte counters.
    WanStatus,
    /// LAN/DHCP page; carries per-port LAN statistics and the WLAN packet info records.
    LanHosts,
}

impl RouterPage {
    /// Path of the page relative to the router root.
    pub fn path(self) -> &'static str {
        match self {
            Self::WanStatus => "/html/bbsp/wanStats/wanStatus_ptvdf.asp",
            Self::LanHosts => "/html/bbsp/landhcp/landhcp_ptvdf.asp",
        }
    }
}

impl fmt::Display for RouterPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::WanStatus => "WAN status page",
            Self::LanHosts => "LAN hosts page",
        })
    }
}

/// Raw HTTP client for the router's web management interface.
///
/// Holds the session cookie jar between [`login`](Self::login) and the page
/// fetches that follow it. Page bodies come back as text with JavaScript
/// escape sequences already resolved.
pub struct RouterClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RouterClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (the router tracks the login session by cookie). The
    /// `base_url` is the router root, e.g. `http://192.168.1.1`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self { http, base_url })
    }

    /// The underlying HTTP client (for the auth flow).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Build a full URL for a router-relative path.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// Fetch a page and return its decoded, unescaped text.
    pub async fn fetch_page(&self, page: RouterPage) -> Result<String, Error> {
        let url = self.url(page.path())?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                page: page.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        trace!(page = %page, bytes = body.len(), "page body received");

        Ok(unescape_js(&body))
    }
}
