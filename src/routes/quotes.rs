use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;

use crate::{
    error::Error,
    routes::parse_id,
    views::{self, IndexView, QuoteView},
    Data,
};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// the front page: every quote, or the ones matching `?q=`.
#[tracing::instrument(skip_all, fields(q = ?params.q))]
pub async fn index(
    State(data): State<Data>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, Error> {
    let quotes = data.quotes.search(params.q.as_deref()).await?;

    views::render(&IndexView::new(quotes, params.q.as_deref()))
}

#[tracing::instrument(skip_all)]
pub async fn random(State(data): State<Data>) -> Result<Html<String>, Error> {
    let quote = data.quotes.random().await?;

    views::render(&QuoteView::new(quote))
}

#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn single(
    State(data): State<Data>,
    Path(id): Path<String>,
) -> Result<Html<String>, Error> {
    let quote = data.quotes.get(parse_id(&id)?).await?;

    views::render(&QuoteView::new(quote))
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use sqlx::{Pool, Sqlite};

    use super::*;
    use crate::models::quotes::NewQuote;

    async fn seeded(db: Pool<Sqlite>) -> (Data, i64, i64) {
        let data = Data::new(db);

        let published = data
            .store
            .create_quote(NewQuote::new("Hello world"))
            .await
            .unwrap();
        let draft = data
            .store
            .create_quote(NewQuote::new("Draft one").draft())
            .await
            .unwrap();

        (data, published.id, draft.id)
    }

    #[sqlx::test]
    async fn index_lists_published_first(db: Pool<Sqlite>) {
        let (data, _, _) = seeded(db).await;

        let html = index(State(data), Query(SearchParams::default()))
            .await
            .unwrap()
            .0;

        let hello = html.find("Hello world").unwrap();
        let draft = html.find("Draft one").unwrap();
        assert!(hello < draft);
    }

    #[sqlx::test]
    async fn index_filters_by_query(db: Pool<Sqlite>) {
        let (data, _, _) = seeded(db).await;

        let html = index(
            State(data),
            Query(SearchParams {
                q: Some("Hello".to_string()),
            }),
        )
        .await
        .unwrap()
        .0;

        assert!(html.contains("Hello world"));
        assert!(!html.contains("Draft one"));
    }

    #[sqlx::test]
    async fn single_renders_quote(db: Pool<Sqlite>) {
        let (data, published, _) = seeded(db).await;

        let html = single(State(data), Path(published.to_string()))
            .await
            .unwrap()
            .0;

        assert!(html.contains("Hello world"));
    }

    #[sqlx::test]
    async fn single_unknown_or_malformed_id_is_404(db: Pool<Sqlite>) {
        let (data, _, _) = seeded(db).await;

        for id in ["9999", "not-a-number"] {
            let response = single(State(data.clone()), Path(id.to_string()))
                .await
                .into_response();

            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[sqlx::test]
    async fn random_shows_published_quote(db: Pool<Sqlite>) {
        let (data, _, _) = seeded(db).await;

        let html = random(State(data)).await.unwrap().0;

        assert!(html.contains("Hello world"));
        assert!(!html.contains("Draft one"));
    }

    #[sqlx::test]
    async fn random_without_published_quotes_is_404(db: Pool<Sqlite>) {
        let data = Data::new(db);

        let response = random(State(data)).await.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
