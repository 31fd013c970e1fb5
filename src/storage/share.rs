//! File service client: shares, file creation, range upload.

use reqwest::Method;
use tracing::debug;

use super::ServiceClient;
use crate::error::RelayResult;

/// Client for the File service.
#[derive(Clone)]
pub struct ShareStore {
    client: ServiceClient,
}

impl ShareStore {
    pub(crate) fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    /// Creates a file share, treating "already exists" as success.
    pub async fn create_share_if_absent(&self, share: &str) -> RelayResult<()> {
        let url = self.client.url(&[share], &[("restype", "share")])?;
        let resp = self
            .client
            .request(Method::PUT, url, &[], None, None)
            .await?;

        if resp.status().as_u16() == 409 {
            debug!("share '{share}' already exists");
            return Ok(());
        }
        self.client.expect_success("create share", resp).await?;
        Ok(())
    }

    /// Creates (or truncates) a file of the given size under the share
    /// root. Contents are written separately with [`upload_range`].
    ///
    /// [`upload_range`]: ShareStore::upload_range
    pub async fn create_file(&self, share: &str, name: &str, size: usize) -> RelayResult<()> {
        let url = self.client.url(&[share, name], &[])?;
        let headers = [
            ("x-ms-type", "file".to_string()),
            ("x-ms-content-length", size.to_string()),
        ];
        let resp = self
            .client
            .request(Method::PUT, url, &headers, None, None)
            .await?;
        self.client.expect_success("create file", resp).await?;
        Ok(())
    }

    /// Writes the whole content as one range starting at offset zero.
    pub async fn upload_range(&self, share: &str, name: &str, data: Vec<u8>) -> RelayResult<()> {
        let url = self.client.url(&[share, name], &[("comp", "range")])?;
        let headers = [
            ("x-ms-write", "update".to_string()),
            ("x-ms-range", format!("bytes=0-{}", data.len().saturating_sub(1))),
        ];
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
        self.client.expect_success("upload range", resp).await?;
        Ok(())
    }
}
