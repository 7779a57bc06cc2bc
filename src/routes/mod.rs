use axum::{routing::get, Router};

use crate::{error::Error, Data};

pub mod api;
pub mod quotes;
pub mod status;

/// builds the whole site. static paths win over `/{id}`, so `/random` and friends never reach
/// the quote lookup.
pub fn router(data: Data) -> Router {
    Router::new()
        .route("/", get(quotes::index))
        .route("/random", get(quotes::random))
        .route("/{id}", get(quotes::single))
        .route("/status", get(status::status))
        .route("/health", get(status::health))
        .nest("/api", api::router())
        .fallback(not_found)
        .with_state(data)
}

pub async fn not_found() -> Error {
    Error::PageNotFound
}

/// ids come in as raw path segments so that `/abc` is a 404 like any other missing quote.
pub(crate) fn parse_id(raw: &str) -> Result<i64, Error> {
    raw.parse::<i64>().map_err(|_| Error::PageNotFound)
}
