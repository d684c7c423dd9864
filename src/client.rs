//! HTTP access to the WAQI feed endpoint.

use std::future::Future;
use std::time::Duration;

use crate::error::{CrawlError, Result, TransportError};

/// Capability to fetch a URL's body.
///
/// Implementations must report non-success statuses as
/// [`TransportError::Status`] rather than returning the body.
pub trait HttpFetch: Send + Sync + 'static {
    fn get(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<Vec<u8>, TransportError>> + Send;
}

/// `GET {base}/feed/@{station_id}/?token={token}`, with the station id
/// and token percent-encoded.
pub fn feed_url(base_url: &str, station_id: &str, token: &str) -> Result<String> {
    let mut url = reqwest::Url::parse(base_url)
        .map_err(|e| CrawlError::Config(format!("Invalid API base URL {}: {}", base_url, e)))?;

    url.path_segments_mut()
        .map_err(|_| CrawlError::Config(format!("API base URL {} cannot have a path", base_url)))?
        .pop_if_empty()
        .push("feed")
        .push(&format!("@{}", station_id))
        .push("");
    url.query_pairs_mut().append_pair("token", token);

    Ok(url.into())
}

pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("aqi-crawler/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str) -> std::result::Result<Vec<u8>, TransportError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
