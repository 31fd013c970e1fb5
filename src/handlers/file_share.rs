//! POST /uploadfile - writes the fixed file to the contracts file share.

use axum::extract::State;
use axum::http::StatusCode;
use tracing::info;

use crate::config::{CONTRACTS_SHARE, UPLOAD_FILE_CONTENT, UPLOAD_FILE_NAME};
use crate::error::RelayError;
use crate::router::AppState;

/// Ensures the share exists, then creates the fixed file sized to the
/// fixed content and uploads that content as a single range. The request
/// body is ignored; every call overwrites the same path, so repeated calls
/// leave exactly one file.
pub async fn upload_file(State(state): State<AppState>) -> Result<StatusCode, RelayError> {
    let shares = &state.storage.shares;

    shares.create_share_if_absent(CONTRACTS_SHARE).await?;
    shares
        .create_file(CONTRACTS_SHARE, UPLOAD_FILE_NAME, UPLOAD_FILE_CONTENT.len())
        .await?;
    shares
        .upload_range(CONTRACTS_SHARE, UPLOAD_FILE_NAME, UPLOAD_FILE_CONTENT.to_vec())
        .await?;

    info!("File uploaded to Azure File Share '{CONTRACTS_SHARE}'.");
    Ok(StatusCode::OK)
}
