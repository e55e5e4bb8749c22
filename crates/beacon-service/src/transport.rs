//! HTTP transport over `reqwest`: one POST per hit, no retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use beacon_core::config::TransportConfig;
use beacon_core::errors::{BeaconError, BeaconResult, ChannelError};
use beacon_core::traits::ITransport;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Convert a string into a `ChannelError::Delivery`.
fn delivery_err(reason: String) -> BeaconError {
    ChannelError::Delivery { reason }.into()
}

/// Production transport. The host flips the online flag from its own
/// connectivity signal; the transport never probes the network itself.
#[derive(Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    online: AtomicBool,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> BeaconResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .build()
            .map_err(|e| delivery_err(e.to_string()))?;
        Ok(Self {
            client,
            online: AtomicBool::new(true),
        })
    }

    pub fn set_online(&self, online: bool) {
        if self.online.swap(online, Ordering::SeqCst) != online {
            tracing::info!(online, "transport: connectivity changed");
        }
    }
}

#[async_trait]
impl ITransport for ReqwestTransport {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    async fn post(&self, url: &str, body: String) -> BeaconResult<()> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| delivery_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(delivery_err(format!("HTTP {status}")));
        }
        Ok(())
    }
}
