//! Queue-message relay: consumes order messages and logs each one.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::storage::QueueStore;

/// Messages fetched per poll, the service maximum.
const MAX_BATCH: u32 = 32;

/// Runs the consumer until the process exits. Each message is rendered,
/// logged, and deleted; transport failures are logged and polling
/// continues. A failed delete leaves the message to the queue's own
/// redelivery, so processing stays at-least-once.
pub async fn run(queues: QueueStore, queue: String, interval: Duration) {
    if let Err(e) = queues.create_queue_if_absent(&queue).await {
        error!("could not ensure queue '{queue}': {e}");
    }
    info!("consuming queue '{queue}'");

    loop {
        let messages = match queues.get_messages(&queue, MAX_BATCH).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!("polling queue '{queue}' failed: {e}");
                tokio::time::sleep(interval).await;
                continue;
            }
        };

        if messages.is_empty() {
            tokio::time::sleep(interval).await;
            continue;
        }

        for message in messages {
            let rendered = render_payload(&message.payload);
            info!("Message received from '{queue}' queue: {rendered}");
            info!("Processing Order: {rendered}");

            if let Err(e) = queues
                .delete_message(&queue, &message.id, &message.pop_receipt)
                .await
            {
                warn!("could not delete message {} from '{queue}': {e}", message.id);
            }
        }
    }
}

/// Renders a payload for logging: UTF-8 text when the bytes decode, the
/// Base64 form otherwise. The fallback never fails, so a malformed payload
/// degrades to a printable representation instead of aborting the relay.
pub fn render_payload(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(e) => {
            warn!("failed to decode message as UTF-8: {e}; logging Base64 form");
            BASE64.encode(payload)
        }
    }
}
