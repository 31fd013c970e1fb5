//! Clients for the four Azure Storage services.
//!
//! Each store wraps a shared `reqwest` client, a service endpoint, and the
//! account credential, and speaks the storage REST API directly. The whole
//! set is built once at startup and shared read-only by every handler and
//! relay task.

mod blob;
mod queue;
mod share;
mod table;

pub use blob::BlobStore;
pub use queue::QueueStore;
pub use share::ShareStore;
pub use table::TableStore;

use chrono::Utc;
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::auth::SharedKeyCredential;
use crate::config::{Config, API_VERSION};
use crate::error::{RelayError, RelayResult};

/// The long-lived handle set: one client per storage kind.
#[derive(Clone)]
pub struct StorageHandles {
    pub blobs: BlobStore,
    pub queues: QueueStore,
    pub tables: TableStore,
    pub shares: ShareStore,
}

impl StorageHandles {
    /// Builds all four clients from the parsed connection string. One
    /// `reqwest::Client` and one credential are shared across them.
    pub fn from_config(config: &Config) -> RelayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        let credential = Arc::new(SharedKeyCredential::new(
            &config.account.name,
            &config.account.key,
        )?);

        let client = |endpoint: &Url| {
            ServiceClient::new(http.clone(), endpoint.clone(), credential.clone())
        };

        Ok(Self {
            blobs: BlobStore::new(client(&config.account.blob_endpoint)),
            queues: QueueStore::new(client(&config.account.queue_endpoint)),
            tables: TableStore::new(client(&config.account.table_endpoint)),
            shares: ShareStore::new(client(&config.account.file_endpoint)),
        })
    }
}

/// Shared request plumbing for one service endpoint.
#[derive(Clone)]
pub(crate) struct ServiceClient {
    http: reqwest::Client,
    endpoint: Url,
    credential: Arc<SharedKeyCredential>,
}

impl ServiceClient {
    pub(crate) fn new(
        http: reqwest::Client,
        endpoint: Url,
        credential: Arc<SharedKeyCredential>,
    ) -> Self {
        Self {
            http,
            endpoint,
            credential,
        }
    }

    pub(crate) fn credential(&self) -> &SharedKeyCredential {
        &self.credential
    }

    /// Builds a request URL under the service endpoint.
    pub(crate) fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> RelayResult<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| RelayError::Url(format!("endpoint cannot be a base: {}", self.endpoint)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Sends a SharedKey-signed request (Blob, Queue, and File services)
    /// and returns the raw response; callers decide which statuses are
    /// acceptable.
    pub(crate) async fn request(
        &self,
        method: Method,
        url: Url,
        extra_ms_headers: &[(&'static str, String)],
        content_type: Option<&'static str>,
        body: Option<Vec<u8>>,
    ) -> RelayResult<reqwest::Response> {
        let date = rfc1123_now();

        let mut ms_headers: Vec<(String, String)> = vec![
            ("x-ms-date".to_string(), date.clone()),
            ("x-ms-version".to_string(), API_VERSION.to_string()),
        ];
        for (name, value) in extra_ms_headers {
            ms_headers.push((name.to_string(), value.clone()));
        }

        let authorization = self.credential.authorize(
            method.as_str(),
            &url,
            body.as_ref().map(Vec::len),
            content_type.unwrap_or(""),
            &ms_headers,
        );

        let mut req = self
            .http
            .request(method, url)
            .header("Authorization", authorization)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION);
        for (name, value) in extra_ms_headers {
            req = req.header(*name, value);
        }
        if let Some(ct) = content_type {
            req = req.header("Content-Type", ct);
        }
        if let Some(body) = body {
            req = req.body(body);
        }

        Ok(req.send().await?)
    }

    /// Fails unless the response status is 2xx, capturing the error body
    /// the service returned.
    pub(crate) async fn expect_success(
        &self,
        operation: &'static str,
        resp: reqwest::Response,
    ) -> RelayResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(RelayError::service(operation, status.as_u16(), body))
    }
}

/// Current UTC time in the RFC 1123 form storage services expect in
/// `x-ms-date`.
pub(crate) fn rfc1123_now() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
