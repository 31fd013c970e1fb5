//! Blob-created relay: watches a container and logs each new blob name.

use std::collections::HashSet;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::storage::BlobStore;

/// Runs the watcher until the process exits. The first listing seeds the
/// seen-set so blobs that existed before startup do not count as created.
/// Listing failures are logged and the loop keeps polling.
pub async fn run(blobs: BlobStore, container: String, interval: Duration) {
    if let Err(e) = blobs.create_container_if_absent(&container).await {
        error!("could not ensure container '{container}': {e}");
    }

    let mut seen: HashSet<String> = match blobs.list_blobs(&container).await {
        Ok(names) => names.into_iter().collect(),
        Err(e) => {
            warn!("initial listing of '{container}' failed: {e}");
            HashSet::new()
        }
    };
    info!(
        "watching container '{container}' for new blobs ({} existing)",
        seen.len()
    );

    loop {
        tokio::time::sleep(interval).await;

        match blobs.list_blobs(&container).await {
            Ok(names) => {
                for name in detect_new(&mut seen, names) {
                    info!("Blob successfully uploaded in '{container}': {name}");
                }
            }
            Err(e) => warn!("listing '{container}' failed: {e}"),
        }
    }
}

/// Returns the names not seen before, adding them to the seen-set.
fn detect_new(seen: &mut HashSet<String>, names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
