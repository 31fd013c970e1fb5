//! Storage-relay: an event-driven relay service for Azure Storage.
//!
//! Holds long-lived clients for the four storage services (Blob, Table,
//! Queue, File Share), built once from a single connection string, and
//! runs four independent relays: a blob-created watcher, a queue consumer,
//! and two HTTP endpoints that write a fixed file and a fixed table record.
//!
//! # Example
//!
//! ```no_run
//! use storage_relay::{Config, RelayServer, StorageAccount};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config {
//!         host: "127.0.0.1".to_string(),
//!         port: 8080,
//!         poll_interval: Duration::from_secs(5),
//!         account: StorageAccount::development(),
//!     };
//!     RelayServer::new(config).unwrap().run().await.unwrap();
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod relay;
pub mod router;
pub mod server;
pub mod storage;

// Re-exports for convenience
pub use config::{Args, Config, StorageAccount};
pub use error::{RelayError, RelayResult};
pub use server::RelayServer;
pub use storage::StorageHandles;
