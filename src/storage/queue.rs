//! Queue service client: create, enqueue, dequeue, delete.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Method;
use tracing::debug;

use super::ServiceClient;
use crate::error::{RelayError, RelayResult};
use crate::models::{QueueMessage, QueueMessagesList};

/// Client for the Queue service.
#[derive(Clone)]
pub struct QueueStore {
    client: ServiceClient,
}

impl QueueStore {
    pub(crate) fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    /// Creates a queue, treating "already exists" as success. The service
    /// answers 204 when the queue exists with identical metadata and 409
    /// when it exists with different metadata; both mean it is there.
    pub async fn create_queue_if_absent(&self, queue: &str) -> RelayResult<()> {
        let url = self.client.url(&[queue], &[])?;
        let resp = self
            .client
            .request(Method::PUT, url, &[], None, None)
            .await?;

        if resp.status().as_u16() == 409 {
            debug!("queue '{queue}' already exists");
            return Ok(());
        }
        self.client.expect_success("create queue", resp).await?;
        Ok(())
    }

    /// Enqueues a message. The payload goes on the wire Base64-encoded,
    /// matching what the storage SDKs produce.
    pub async fn put_message(&self, queue: &str, payload: &[u8]) -> RelayResult<()> {
        let url = self.client.url(&[queue, "messages"], &[])?;
        let body = format!(
            "<QueueMessage><MessageText>{}</MessageText></QueueMessage>",
            BASE64.encode(payload)
        );
        let resp = self
            .client
            .request(
                Method::POST,
                url,
                &[],
                Some("application/xml"),
                Some(body.into_bytes()),
            )
            .await?;
        self.client.expect_success("put message", resp).await?;
        Ok(())
    }

    /// Dequeues up to `max` messages, decoding each payload to raw bytes.
    pub async fn get_messages(&self, queue: &str, max: u32) -> RelayResult<Vec<QueueMessage>> {
        let max = max.to_string();
        let url = self
            .client
            .url(&[queue, "messages"], &[("numofmessages", &max)])?;
        let resp = self
            .client
            .request(Method::GET, url, &[], None, None)
            .await?;
        let resp = self.client.expect_success("get messages", resp).await?;

        let body = resp.text().await?;
        let list: QueueMessagesList = quick_xml::de::from_str(&body)
            .map_err(|e| RelayError::decode("get messages", e))?;

        Ok(list
            .messages
            .into_iter()
            .map(|m| QueueMessage {
                payload: decode_message_text(&m.message_text),
                id: m.message_id,
                pop_receipt: m.pop_receipt,
            })
            .collect())
    }

    /// Deletes one dequeued message using its pop receipt.
    pub async fn delete_message(
        &self,
        queue: &str,
        message_id: &str,
        pop_receipt: &str,
    ) -> RelayResult<()> {
        let url = self.client.url(
            &[queue, "messages", message_id],
            &[("popreceipt", pop_receipt)],
        )?;
        let resp = self
            .client
            .request(Method::DELETE, url, &[], None, None)
            .await?;
        self.client.expect_success("delete message", resp).await?;
        Ok(())
    }
}

/// Decodes a wire `MessageText` to payload bytes. SDK-produced messages are
/// Base64; anything that does not decode is taken as raw text bytes.
fn decode_message_text(text: &str) -> Vec<u8> {
    BASE64
        .decode(text)
        .unwrap_or_else(|_| text.as_bytes().to_vec())
}
