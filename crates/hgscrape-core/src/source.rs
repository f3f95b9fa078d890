// ── Page sources ──
//
// The poller needs two decoded pages per tick and does not care where they
// come from. `RouterSource` is the real thing: a fresh client, cookie jar
// and login for every call, so no session outlives its tick.

use std::future::Future;

use hgscrape_api::{RouterClient, RouterPage, TransportConfig};
use tracing::debug;

use crate::config::RouterConfig;
use crate::error::CoreError;

/// Decoded text of both router pages for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterPages {
    /// WAN status page; source of the WAN counters.
    pub wan_status: String,
    /// LAN hosts page; source of the LAN and WLAN counters.
    pub lan_hosts: String,
}

/// Anything that can produce a fresh pair of router pages.
pub trait PageSource: Send + Sync {
    /// Fetch both pages. Any failure aborts the whole tick.
    fn fetch_pages(&self) -> impl Future<Output = Result<RouterPages, CoreError>> + Send;
}

/// Page source that logs into the router on every call.
pub struct RouterSource {
    config: RouterConfig,
}

impl RouterSource {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.config.timeout,
            accept_invalid_certs: self.config.accept_invalid_certs,
            ..TransportConfig::default()
        }
    }
}

impl PageSource for RouterSource {
    async fn fetch_pages(&self) -> Result<RouterPages, CoreError> {
        let client = RouterClient::new(self.config.url.clone(), &self.transport())?;

        client
            .login(&self.config.username, &self.config.password)
            .await?;
        debug!(router = %self.config.url, "logged in");

        let wan_status = client.fetch_page(RouterPage::WanStatus).await?;
        let lan_hosts = client.fetch_page(RouterPage::LanHosts).await?;

        Ok(RouterPages {
            wan_status,
            lan_hosts,
        })
    }
}
