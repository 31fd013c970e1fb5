//! Storage-relay: event-driven relay service for Azure Storage.

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use storage_relay::{Args, Config, RelayServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug {
        Level::DEBUG
    } else if args.silent {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let config = Config::from_args(args)?;
    let server = RelayServer::new(config)?;

    println!(
        "Storage relay is starting at {}\n\nPOST /uploadfile and /storetable; watching 'product-images' and 'order-processing'.\n",
        server.base_url()
    );

    server.run().await
}
