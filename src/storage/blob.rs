//! Blob service client: containers and block blobs.

use reqwest::Method;
use tracing::debug;

use super::ServiceClient;
use crate::error::RelayResult;
use crate::models::BlobList;

/// Client for the Blob service.
#[derive(Clone)]
pub struct BlobStore {
    client: ServiceClient,
}

impl BlobStore {
    pub(crate) fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    /// Creates a container, treating "already exists" as success.
    pub async fn create_container_if_absent(&self, container: &str) -> RelayResult<()> {
        let url = self.client.url(&[container], &[("restype", "container")])?;
        let resp = self
            .client
            .request(Method::PUT, url, &[], None, None)
            .await?;

        if resp.status().as_u16() == 409 {
            debug!("container '{container}' already exists");
            return Ok(());
        }
        self.client.expect_success("create container", resp).await?;
        Ok(())
    }

    /// Lists all blob names in a container, following continuation markers
    /// until the listing is exhausted.
    pub async fn list_blobs(&self, container: &str) -> RelayResult<Vec<String>> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut query = vec![("restype", "container"), ("comp", "list")];
            if let Some(m) = marker.as_deref() {
                query.push(("marker", m));
            }
            let url = self.client.url(&[container], &query)?;
            let resp = self
                .client
                .request(Method::GET, url, &[], None, None)
                .await?;
            let resp = self.client.expect_success("list blobs", resp).await?;

            let body = resp.text().await?;
            let list: BlobList = quick_xml::de::from_str(&body)
                .map_err(|e| crate::error::RelayError::decode("list blobs", e))?;

            names.extend(list.blobs.items.iter().map(|b| b.name.clone()));
            match list.continuation() {
                Some(next) => marker = Some(next.to_string()),
                None => break,
            }
        }

        Ok(names)
    }

    /// Uploads a block blob, overwriting any existing blob at that name.
    pub async fn put_blob(&self, container: &str, name: &str, data: Vec<u8>) -> RelayResult<()> {
        let url = self.client.url(&[container, name], &[])?;
        let headers = [("x-ms-blob-type", "BlockBlob".to_string())];
        let resp = self
            .client
            .request(
                Method::PUT,
                url,
                &headers,
                Some("application/octet-stream"),
                Some(data),
            )
            .await?;
        self.client.expect_success("put blob", resp).await?;
        Ok(())
    }
}
