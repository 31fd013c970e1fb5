//! HTTP server and background relay tasks.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{Config, ORDER_QUEUE, PRODUCT_IMAGES_CONTAINER};
use crate::error::RelayResult;
use crate::relay;
use crate::router::{create_router, AppState};
use crate::storage::StorageHandles;

/// The relay server: two HTTP endpoints plus the blob watcher and queue
/// consumer tasks, all sharing one storage handle set.
pub struct RelayServer {
    config: Arc<Config>,
    storage: Arc<StorageHandles>,
}

impl RelayServer {
    /// Creates a server, building the storage handle set from the
    /// configured connection string.
    pub fn new(config: Config) -> RelayResult<Self> {
        let storage = Arc::new(StorageHandles::from_config(&config)?);
        Ok(Self {
            config: Arc::new(config),
            storage,
        })
    }

    /// Returns the shared storage handles.
    pub fn storage(&self) -> Arc<StorageHandles> {
        self.storage.clone()
    }

    /// Runs the server: spawns the relay tasks, then serves the HTTP
    /// endpoints until the process exits.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_address().parse()?;

        tokio::spawn(relay::blob_watch::run(
            self.storage.blobs.clone(),
            PRODUCT_IMAGES_CONTAINER.to_string(),
            self.config.poll_interval,
        ));
        tokio::spawn(relay::queue_consumer::run(
            self.storage.queues.clone(),
            ORDER_QUEUE.to_string(),
            self.config.poll_interval,
        ));

        let state = AppState {
            config: self.config.clone(),
            storage: self.storage.clone(),
        };

        let app = create_router(state)
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http());

        info!(
            "storage relay listening at http://{addr} (account '{}')",
            self.config.account.name
        );

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        self.config.bind_address()
    }

    /// Returns the base URL for the HTTP endpoints.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.bind_address())
    }
}
