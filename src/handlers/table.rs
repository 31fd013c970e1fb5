//! POST /storetable - inserts one customer profile record.

use axum::extract::State;
use axum::http::StatusCode;
use tracing::info;

use crate::config::CUSTOMER_TABLE;
use crate::error::RelayError;
use crate::models::CustomerProfile;
use crate::router::AppState;

/// Ensures the table exists, then inserts one profile with a fresh row
/// key. The request body is ignored; every call produces a new distinct
/// record.
pub async fn store_table(State(state): State<AppState>) -> Result<StatusCode, RelayError> {
    let tables = &state.storage.tables;

    tables.create_table_if_absent(CUSTOMER_TABLE).await?;

    let profile = CustomerProfile::generate();
    tables.insert_entity(CUSTOMER_TABLE, &profile).await?;

    info!("Entity {} added to table.", profile.first_name);
    Ok(StatusCode::OK)
}
