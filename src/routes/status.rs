use std::time::UNIX_EPOCH;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{
    constants::{version::get_version, STARTUP_TIME},
    routes::api::ApiError,
    Data,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Status {
    pub version: String,
    pub rust: String,
    pub quotes: i64,
    pub started_at: u64,
}

/// get the service's status.
#[tracing::instrument(skip_all)]
pub async fn status(State(data): State<Data>) -> Result<Json<Status>, ApiError> {
    let quotes = data.store.count_quotes().await?;

    let started_at = STARTUP_TIME
        .duration_since(UNIX_EPOCH)
        .map(|uptime| uptime.as_secs())
        .unwrap_or_default();

    Ok(Json(Status {
        version: get_version(),
        rust: rustc_version_runtime::version().to_string(),
        quotes,
        started_at,
    }))
}

pub async fn health() -> &'static str {
    "ok"
}
