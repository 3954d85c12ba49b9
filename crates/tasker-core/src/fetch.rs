//! Loading payloads from a remote URL.
//!
//! One blocking GET per call. Requests are not de-duplicated or retried;
//! a failure is reported once to the caller.

use reqwest::blocking::Client;
use tracing::{debug, info};
use url::Url;

use crate::config::TaskerConfig;
use crate::error::FetchError;

/// Source of raw payload bytes for a URL.
pub trait PayloadFetcher {
    /// Fetches the body behind `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// HTTP implementation of [`PayloadFetcher`].
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: Client,
}

impl RemoteFetcher {
    /// Creates a fetcher using the configured timeout and user agent.
    pub fn new(config: &TaskerConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

impl PayloadFetcher for RemoteFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = parse_url(url)?;
        info!(url = %parsed, "Fetching remote payload");

        let response = self.client.get(parsed).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes()?;
        debug!(url = %url, bytes = body.len(), "Remote payload received");
        Ok(body.to_vec())
    }
}

/// Parses and checks an http(s) URL.
pub fn parse_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
