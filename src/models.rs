//! Entity and wire-format models for the storage services.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer profile row for the `CustomerProfiles` table, serialized as
/// OData JSON for Insert Entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerProfile {
    #[serde(rename = "PartitionKey")]
    pub partition_key: String,
    #[serde(rename = "RowKey")]
    pub row_key: String,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "Email")]
    pub email: String,
}

impl CustomerProfile {
    /// Builds the fixed demo profile with a freshly generated row key, so
    /// repeated inserts never collide.
    pub fn generate() -> Self {
        Self {
            partition_key: "PartitionKey".to_string(),
            row_key: Uuid::new_v4().to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@example.com".to_string(),
        }
    }
}

/// List Blobs response body (`EnumerationResults`).
#[derive(Debug, Default, Deserialize)]
pub struct BlobList {
    #[serde(rename = "Blobs", default)]
    pub blobs: BlobItems,
    #[serde(rename = "NextMarker")]
    pub next_marker: Option<String>,
}

impl BlobList {
    /// Returns the continuation marker, treating the empty element Azure
    /// emits on the last page as "no more pages".
    pub fn continuation(&self) -> Option<&str> {
        self.next_marker.as_deref().filter(|m| !m.is_empty())
    }
}

/// The `<Blobs>` collection inside a List Blobs response.
#[derive(Debug, Default, Deserialize)]
pub struct BlobItems {
    #[serde(rename = "Blob", default)]
    pub items: Vec<BlobItem>,
}

/// One `<Blob>` entry; only the name matters to the relay.
#[derive(Debug, Deserialize)]
pub struct BlobItem {
    #[serde(rename = "Name")]
    pub name: String,
}

/// Get Messages response body (`QueueMessagesList`).
#[derive(Debug, Default, Deserialize)]
pub struct QueueMessagesList {
    #[serde(rename = "QueueMessage", default)]
    pub messages: Vec<WireQueueMessage>,
}

/// One dequeued message as it appears on the wire. `MessageText` carries
/// the Base64 form of the payload by SDK convention.
#[derive(Debug, Deserialize)]
pub struct WireQueueMessage {
    #[serde(rename = "MessageId")]
    pub message_id: String,
    #[serde(rename = "PopReceipt")]
    pub pop_receipt: String,
    #[serde(rename = "MessageText", default)]
    pub message_text: String,
}

/// A dequeued message with its payload decoded to raw bytes.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// Server-assigned message id, needed to delete the message.
    pub id: String,
    /// Receipt proving this dequeue, needed to delete the message.
    pub pop_receipt: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_profiles_have_fixed_fields_and_unique_keys() {
        let a = CustomerProfile::generate();
        let b = CustomerProfile::generate();
        assert_eq!(a.first_name, "John");
        assert_eq!(a.last_name, "Doe");
        assert_eq!(a.email, "john.doe@example.com");
        assert_eq!(a.partition_key, b.partition_key);
        assert_ne!(a.row_key, b.row_key);
    }

    #[test]
    fn profile_serializes_with_pascal_case_odata_keys() {
        let profile = CustomerProfile::generate();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["FirstName"], "John");
        assert_eq!(json["PartitionKey"], "PartitionKey");
        assert!(json.get("RowKey").is_some());
    }

    #[test]
    fn parses_list_blobs_response() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="http://127.0.0.1:10000/devstoreaccount1/" ContainerName="product-images">
  <Blobs>
    <Blob><Name>shoe.png</Name><Properties><Content-Length>4</Content-Length></Properties></Blob>
    <Blob><Name>hat.png</Name><Properties/></Blob>
  </Blobs>
  <NextMarker/>
</EnumerationResults>"#;
        let list: BlobList = quick_xml::de::from_str(xml).unwrap();
        let names: Vec<_> = list.blobs.items.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["shoe.png", "hat.png"]);
        assert_eq!(list.continuation(), None);
    }

    #[test]
    fn parses_empty_list_blobs_response() {
        let xml = r#"<EnumerationResults><Blobs/><NextMarker>abc</NextMarker></EnumerationResults>"#;
        let list: BlobList = quick_xml::de::from_str(xml).unwrap();
        assert!(list.blobs.items.is_empty());
        assert_eq!(list.continuation(), Some("abc"));
    }

    #[test]
    fn parses_queue_messages_response() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<QueueMessagesList>
  <QueueMessage>
    <MessageId>7b1b3a2e-9f64-4bb3-9f0f-64f9f5a2a0f1</MessageId>
    <InsertionTime>Mon, 18 Aug 2025 09:00:00 GMT</InsertionTime>
    <ExpirationTime>Mon, 25 Aug 2025 09:00:00 GMT</ExpirationTime>
    <PopReceipt>AgAAAAMAAAAAAAAA</PopReceipt>
    <TimeNextVisible>Mon, 18 Aug 2025 09:00:30 GMT</TimeNextVisible>
    <DequeueCount>1</DequeueCount>
    <MessageText>b3JkZXItNDI=</MessageText>
  </QueueMessage>
</QueueMessagesList>"#;
        let list: QueueMessagesList = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(list.messages.len(), 1);
        assert_eq!(list.messages[0].message_text, "b3JkZXItNDI=");
        assert_eq!(list.messages[0].pop_receipt, "AgAAAAMAAAAAAAAA");
    }

    #[test]
    fn parses_empty_queue_messages_response() {
        let xml = r#"<QueueMessagesList/>"#;
        let list: QueueMessagesList = quick_xml::de::from_str(xml).unwrap();
        assert!(list.messages.is_empty());
    }
}
