use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::{
    error::Error,
    models::quotes::Quote,
    routes::{parse_id, quotes::SearchParams},
    Data,
};

pub fn router() -> Router<Data> {
    Router::new()
        .route("/quotes", get(list))
        .route("/quotes/random", get(random))
        .route("/quotes/{id}", get(single))
        .fallback(not_found)
}

/// wraps [`Error`] so json routes answer with a json body instead of the error page.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();

        if status.is_server_error() {
            tracing::error!(err = ?self.0, "an error occurred when handling api request");
        }

        (status, Json(json!({ "error": self.0.public_message() }))).into_response()
    }
}

#[tracing::instrument(skip_all, fields(q = ?params.q))]
pub async fn list(
    State(data): State<Data>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    let quotes = data.quotes.search(params.q.as_deref()).await?;

    Ok(Json(quotes))
}

#[tracing::instrument(skip_all)]
pub async fn random(State(data): State<Data>) -> Result<Json<Quote>, ApiError> {
    Ok(Json(data.quotes.random().await?))
}

#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn single(
    State(data): State<Data>,
    Path(id): Path<String>,
) -> Result<Json<Quote>, ApiError> {
    let quote = data.quotes.get(parse_id(&id)?).await?;

    Ok(Json(quote))
}

async fn not_found() -> ApiError {
    ApiError(Error::PageNotFound)
}
