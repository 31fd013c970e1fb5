//! Server configuration and connection-string parsing.

use clap::Parser;
use std::time::Duration;
use url::Url;

use crate::error::{RelayError, RelayResult};

/// Environment variable consulted when `--connection-string` is absent.
pub const CONNECTION_STRING_ENV: &str = "AZURE_STORAGE_CONNECTION_STRING";

/// Default account name for development storage (Azurite).
pub const DEV_ACCOUNT: &str = "devstoreaccount1";

/// Default account key for development storage (base64 encoded).
pub const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";

/// Default HTTP bind port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default poll period for the queue consumer and blob watcher, in seconds.
pub const DEFAULT_POLL_SECS: u64 = 5;

/// Storage API version sent with every request.
pub const API_VERSION: &str = "2021-10-04";

/// Container watched for new blobs.
pub const PRODUCT_IMAGES_CONTAINER: &str = "product-images";

/// Queue consumed for order messages.
pub const ORDER_QUEUE: &str = "order-processing";

/// File share receiving uploaded files.
pub const CONTRACTS_SHARE: &str = "contracts-logs";

/// Table accumulating customer profile records.
pub const CUSTOMER_TABLE: &str = "CustomerProfiles";

/// Fixed file name written by the upload endpoint.
pub const UPLOAD_FILE_NAME: &str = "uploadedfile.txt";

/// Fixed file content written by the upload endpoint.
pub const UPLOAD_FILE_CONTENT: &[u8] = b"Sample file content";

/// Command-line arguments for the relay service.
#[derive(Parser, Debug, Clone)]
#[command(name = "storage-relay")]
#[command(about = "Event-driven relay service for Azure Storage")]
#[command(version)]
pub struct Args {
    /// Host address to bind to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port for the HTTP endpoints.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Azure Storage connection string. Falls back to the
    /// AZURE_STORAGE_CONNECTION_STRING environment variable.
    #[arg(long)]
    pub connection_string: Option<String>,

    /// Poll period for the queue consumer and blob watcher, in seconds.
    #[arg(long, default_value_t = DEFAULT_POLL_SECS)]
    pub poll_interval: u64,

    /// Enable debug logging.
    #[arg(long, short = 'd')]
    pub debug: bool,

    /// Enable silent mode (minimal logging).
    #[arg(long, short = 's')]
    pub silent: bool,
}

/// Service configuration derived from command-line arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address to bind to.
    pub host: String,
    /// Port for the HTTP endpoints.
    pub port: u16,
    /// Poll period for the queue consumer and blob watcher.
    pub poll_interval: Duration,
    /// Storage account credentials and endpoints.
    pub account: StorageAccount,
}

impl Config {
    /// Builds the configuration from parsed arguments, reading the
    /// connection string from the environment when not given on the
    /// command line.
    pub fn from_args(args: Args) -> RelayResult<Self> {
        let conn = match args.connection_string {
            Some(c) => c,
            None => std::env::var(CONNECTION_STRING_ENV).map_err(|_| {
                RelayError::Config(format!(
                    "no connection string: pass --connection-string or set {}",
                    CONNECTION_STRING_ENV
                ))
            })?,
        };

        Ok(Self {
            host: args.host,
            port: args.port,
            poll_interval: Duration::from_secs(args.poll_interval),
            account: StorageAccount::from_connection_string(&conn)?,
        })
    }

    /// Returns the bind address for the HTTP endpoints.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A storage account: credentials plus one endpoint per service.
///
/// Parsed once from the connection string at startup and never mutated;
/// every handler and relay task shares it by reference.
#[derive(Debug, Clone)]
pub struct StorageAccount {
    /// Account name.
    pub name: String,
    /// Account key, base64 encoded as it appears in the connection string.
    pub key: String,
    /// Blob service endpoint.
    pub blob_endpoint: Url,
    /// Queue service endpoint.
    pub queue_endpoint: Url,
    /// Table service endpoint.
    pub table_endpoint: Url,
    /// File service endpoint.
    pub file_endpoint: Url,
}

impl StorageAccount {
    /// Parses an Azure Storage connection string.
    ///
    /// Recognized keys: `DefaultEndpointsProtocol`, `AccountName`,
    /// `AccountKey`, `EndpointSuffix`, explicit `BlobEndpoint` /
    /// `QueueEndpoint` / `TableEndpoint` / `FileEndpoint` overrides, and
    /// `UseDevelopmentStorage=true` which expands to the well-known
    /// Azurite account. Explicit endpoints win over derived ones.
    pub fn from_connection_string(conn: &str) -> RelayResult<Self> {
        let mut protocol = "https".to_string();
        let mut suffix = "core.windows.net".to_string();
        let mut name: Option<String> = None;
        let mut key: Option<String> = None;
        let mut blob: Option<String> = None;
        let mut queue: Option<String> = None;
        let mut table: Option<String> = None;
        let mut file: Option<String> = None;

        for part in conn.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (k, v) = part.split_once('=').ok_or_else(|| {
                RelayError::Config(format!("malformed connection string segment: {part:?}"))
            })?;
            match k {
                "UseDevelopmentStorage" if v.eq_ignore_ascii_case("true") => {
                    return Ok(Self::development());
                }
                "DefaultEndpointsProtocol" => protocol = v.to_string(),
                "EndpointSuffix" => suffix = v.to_string(),
                "AccountName" => name = Some(v.to_string()),
                "AccountKey" => key = Some(v.to_string()),
                "BlobEndpoint" => blob = Some(v.to_string()),
                "QueueEndpoint" => queue = Some(v.to_string()),
                "TableEndpoint" => table = Some(v.to_string()),
                "FileEndpoint" => file = Some(v.to_string()),
                _ => {}
            }
        }

        let name = name
            .ok_or_else(|| RelayError::Config("connection string has no AccountName".into()))?;
        let key =
            key.ok_or_else(|| RelayError::Config("connection string has no AccountKey".into()))?;

        let endpoint = |service: &str, explicit: Option<String>| -> RelayResult<Url> {
            let raw =
                explicit.unwrap_or_else(|| format!("{protocol}://{name}.{service}.{suffix}"));
            Url::parse(&raw)
                .map_err(|e| RelayError::Config(format!("invalid {service} endpoint {raw:?}: {e}")))
        };

        let blob_endpoint = endpoint("blob", blob)?;
        let queue_endpoint = endpoint("queue", queue)?;
        let table_endpoint = endpoint("table", table)?;
        let file_endpoint = endpoint("file", file)?;

        Ok(Self {
            name,
            key,
            blob_endpoint,
            queue_endpoint,
            table_endpoint,
            file_endpoint,
        })
    }

    /// Returns the well-known local development storage account.
    pub fn development() -> Self {
        let ep = |port: u16| {
            Url::parse(&format!("http://127.0.0.1:{port}/{DEV_ACCOUNT}"))
                .expect("static development endpoint")
        };
        Self {
            name: DEV_ACCOUNT.to_string(),
            key: DEV_ACCOUNT_KEY.to_string(),
            blob_endpoint: ep(10000),
            queue_endpoint: ep(10001),
            table_endpoint: ep(10002),
            file_endpoint: ep(10003),
        }
    }
}
