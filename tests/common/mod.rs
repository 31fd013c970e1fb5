//! Common test utilities: an in-process mock of the four storage services.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::net::TcpListener;

use storage_relay::{Config, RelayServer};

const TEST_ACCOUNT: &str = "devstoreaccount1";
const TEST_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";

/// One request the mock received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
pub struct MockState {
    pub requests: Vec<Recorded>,
    /// Pending queue messages as Base64 message texts.
    pub queue: VecDeque<String>,
    /// Blob names in the watched container.
    pub blobs: Vec<String>,
    next_id: u64,
}

/// Mock storage server answering minimal Blob, Queue, Table, and File
/// requests under the `/blob`, `/queue`, `/table`, and `/file` prefixes.
#[derive(Clone)]
pub struct MockStorage {
    pub base_url: String,
    pub state: Arc<Mutex<MockState>>,
}

impl MockStorage {
    /// Starts the mock on a random port.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState::default()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let app = Router::new()
            .fallback(dispatch)
            .with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Connection string pointing every service at this mock.
    pub fn connection_string(&self) -> String {
        format!(
            "AccountName={acct};AccountKey={key};\
             BlobEndpoint={base}/blob;QueueEndpoint={base}/queue;\
             TableEndpoint={base}/table;FileEndpoint={base}/file",
            acct = TEST_ACCOUNT,
            key = TEST_KEY,
            base = self.base_url
        )
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().requests.clone()
    }

    /// Requests matching a method and path prefix.
    pub fn requests_matching(&self, method: &str, path_prefix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path.starts_with(path_prefix))
            .collect()
    }

    /// Seeds a pending queue message (Base64-encoded, SDK convention).
    pub fn enqueue(&self, payload: &[u8]) {
        use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
        self.state.lock().queue.push_back(BASE64.encode(payload));
    }

    pub fn pending_messages(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Seeds a blob into the watched container.
    pub fn add_blob(&self, name: &str) {
        self.state.lock().blobs.push(name.to_string());
    }
}

/// Starts a relay server wired to the given mock, returning its base URL.
pub async fn start_relay(mock: &MockStorage, poll_millis: u64) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = Config {
        host: "127.0.0.1".to_string(),
        port,
        poll_interval: std::time::Duration::from_millis(poll_millis),
        account: storage_relay::StorageAccount::from_connection_string(
            &mock.connection_string(),
        )
        .unwrap(),
    };

    let server = RelayServer::new(config).unwrap();
    let base_url = server.base_url();

    tokio::spawn(async move {
        server.run().await.unwrap();
    });

    // Wait for the server to be ready
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    base_url
}

/// Builds a storage handle set wired directly to the mock, for driving
/// storage operations from tests.
pub fn storage_handles(mock: &MockStorage) -> storage_relay::StorageHandles {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        poll_interval: std::time::Duration::from_secs(1),
        account: storage_relay::StorageAccount::from_connection_string(
            &mock.connection_string(),
        )
        .unwrap(),
    };
    storage_relay::StorageHandles::from_config(&config).unwrap()
}

async fn dispatch(
    State(state): State<Arc<Mutex<MockState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let query = uri.query().unwrap_or("").to_string();

    let recorded = Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: query.clone(),
        body: body.to_vec(),
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect(),
    };

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let service = segments.first().copied().unwrap_or("");

    let mut state = state.lock();
    state.requests.push(recorded);

    match service {
        "blob" => blob_service(&mut state, &method, &segments, &query),
        "queue" => queue_service(&mut state, &method, &segments, &body),
        "table" => table_service(&method),
        "file" => file_service(&method),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn blob_service(
    state: &mut MockState,
    method: &Method,
    segments: &[&str],
    query: &str,
) -> Response {
    if *method == Method::PUT && query.contains("restype=container") {
        StatusCode::CREATED.into_response()
    } else if *method == Method::PUT && segments.len() >= 3 {
        // Put Blob
        let name = segments[2..].join("/");
        if !state.blobs.contains(&name) {
            state.blobs.push(name);
        }
        StatusCode::CREATED.into_response()
    } else if *method == Method::GET && query.contains("comp=list") {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="utf-8"?><EnumerationResults><Blobs>"#,
        );
        for name in &state.blobs {
            xml.push_str(&format!("<Blob><Name>{}</Name></Blob>", name));
        }
        xml.push_str("</Blobs><NextMarker/></EnumerationResults>");
        ([("content-type", "application/xml")], xml).into_response()
    } else {
        StatusCode::BAD_REQUEST.into_response()
    }
}

fn queue_service(
    state: &mut MockState,
    method: &Method,
    segments: &[&str],
    body: &Bytes,
) -> Response {
    let is_messages = segments.get(2) == Some(&"messages");
    if *method == Method::PUT && segments.len() == 2 {
        StatusCode::CREATED.into_response()
    } else if *method == Method::POST && is_messages {
        // Put Message: pull the Base64 text out of the XML body.
        let text = String::from_utf8_lossy(body);
        let encoded = text
            .split("<MessageText>")
            .nth(1)
            .and_then(|rest| rest.split("</MessageText>").next())
            .unwrap_or("")
            .to_string();
        state.queue.push_back(encoded);
        StatusCode::CREATED.into_response()
    } else if *method == Method::GET && is_messages {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="utf-8"?><QueueMessagesList>"#,
        );
        while let Some(text) = state.queue.pop_front() {
            state.next_id += 1;
            xml.push_str(&format!(
                "<QueueMessage><MessageId>msg-{id}</MessageId>\
                 <PopReceipt>pr-{id}</PopReceipt>\
                 <MessageText>{text}</MessageText></QueueMessage>",
                id = state.next_id,
            ));
        }
        xml.push_str("</QueueMessagesList>");
        ([("content-type", "application/xml")], xml).into_response()
    } else if *method == Method::DELETE && is_messages && segments.len() == 4 {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::BAD_REQUEST.into_response()
    }
}

fn table_service(method: &Method) -> Response {
    // Create Table and Insert Entity both answer 201.
    if *method == Method::POST {
        StatusCode::CREATED.into_response()
    } else {
        StatusCode::BAD_REQUEST.into_response()
    }
}

fn file_service(method: &Method) -> Response {
    // Create Share, Create File, and Put Range all answer 201.
    if *method == Method::PUT {
        StatusCode::CREATED.into_response()
    } else {
        StatusCode::BAD_REQUEST.into_response()
    }
}
