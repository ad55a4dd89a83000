// ChiloDisco - app/client.rs
//
// Snapshot source: fetches `/api/logs` from the log server.
//
// Every request defeats caches twice over: a `t=<epoch millis>` query
// parameter and a `Cache-Control: no-store` header. The client is blocking
// and only ever used from the poll thread.

use crate::core::model::{LogSnapshot, RawSnapshot};
use crate::util::constants::{CACHE_BUSTER_PARAM, LOGS_ENDPOINT_PATH};
use crate::util::error::FetchError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use reqwest::Url;
use std::time::Duration;

/// Anything that can produce a log snapshot on demand.
///
/// The poll thread owns its source, hence `Send`.
pub trait SnapshotSource: Send {
    fn fetch(&mut self) -> Result<LogSnapshot, FetchError>;

    /// Human-readable origin for log messages.
    fn describe(&self) -> String;
}

/// HTTP source for `GET {base_url}/api/logs`.
pub struct HttpSnapshotSource {
    client: Client,
    endpoint: Url,
}

impl HttpSnapshotSource {
    /// Build a source for `base_url` with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let endpoint = endpoint_url(base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client { source: e })?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl SnapshotSource for HttpSnapshotSource {
    fn fetch(&mut self) -> Result<LogSnapshot, FetchError> {
        let stamp = chrono::Utc::now().timestamp_millis();
        let url = with_cache_buster(&self.endpoint, stamp);
        let url_text = url.to_string();

        tracing::debug!(url = %url_text, "Fetching snapshot");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Request {
                url: url_text.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url_text,
                status: status.as_u16(),
            });
        }

        let raw: RawSnapshot = response.json().map_err(|e| FetchError::Decode {
            url: url_text,
            source: e,
        })?;

        Ok(LogSnapshot::from_raw(raw))
    }

    fn describe(&self) -> String {
        self.endpoint.to_string()
    }
}

/// `{base_url}/api/logs`, keeping any path prefix of the base URL.
pub fn endpoint_url(base_url: &str) -> Result<Url, FetchError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: base_url.to_string(),
        reason,
    };

    let url = Url::parse(&format!("{trimmed}{LOGS_ENDPOINT_PATH}"))
        .map_err(|e| invalid(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

/// Append the cache-buster query parameter.
pub fn with_cache_buster(endpoint: &Url, epoch_millis: i64) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair(CACHE_BUSTER_PARAM, &epoch_millis.to_string());
    url
}
