//! Table service client: create table, insert entity.
//!
//! The Table service signs with its own shorter string-to-sign and speaks
//! OData JSON rather than XML, so it bypasses the generic request path.

use reqwest::Method;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::{rfc1123_now, ServiceClient};
use crate::config::API_VERSION;
use crate::error::RelayResult;

const ODATA_CONTENT_TYPE: &str = "application/json";
const ODATA_ACCEPT: &str = "application/json;odata=nometadata";

/// Client for the Table service.
#[derive(Clone)]
pub struct TableStore {
    client: ServiceClient,
}

#[derive(Serialize)]
struct CreateTableBody<'a> {
    #[serde(rename = "TableName")]
    table_name: &'a str,
}

impl TableStore {
    pub(crate) fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    /// Creates a table, treating "already exists" as success.
    pub async fn create_table_if_absent(&self, table: &str) -> RelayResult<()> {
        let url = self.client.url(&["Tables"], &[])?;
        let body = serde_json::to_vec(&CreateTableBody { table_name: table })
            .expect("static body serializes");

        let resp = self.send(Method::POST, url, body).await?;
        if resp.status().as_u16() == 409 {
            debug!("table '{table}' already exists");
            return Ok(());
        }
        self.client.expect_success("create table", resp).await?;
        Ok(())
    }

    /// Inserts one entity into a table as OData JSON.
    pub async fn insert_entity<T: Serialize>(&self, table: &str, entity: &T) -> RelayResult<()> {
        let url = self.client.url(&[table], &[])?;
        let body = serde_json::to_vec(entity)
            .map_err(|e| crate::error::RelayError::decode("insert entity", e))?;

        let resp = self.send(Method::POST, url, body).await?;
        self.client.expect_success("insert entity", resp).await?;
        Ok(())
    }

    /// Sends a Table-service-signed JSON request.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Vec<u8>,
    ) -> RelayResult<reqwest::Response> {
        let date = rfc1123_now();
        let authorization =
            self.client
                .credential()
                .authorize_table(method.as_str(), &url, &date, ODATA_CONTENT_TYPE);

        let resp = self
            .client
            .http
            .request(method, url)
            .header("Authorization", authorization)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION)
            .header("Content-Type", ODATA_CONTENT_TYPE)
            .header("Accept", ODATA_ACCEPT)
            .header("DataServiceVersion", "3.0;NetFx")
            .body(body)
            .send()
            .await?;
        Ok(resp)
    }
}
