use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::views::{self, ErrorView};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("quote {0} does not exist.")]
    QuoteNotFound(i64),

    #[error("author {0} does not exist.")]
    AuthorNotFound(i64),

    #[error("there are no published quotes yet.")]
    NoPublishedQuotes,

    #[error("there's nothing here.")]
    PageNotFound,

    #[error("quote text must not be empty.")]
    EmptyText,

    #[error("author name must not be blank.")]
    BlankAuthorName,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::QuoteNotFound(_)
                | Error::AuthorNotFound(_)
                | Error::NoPublishedQuotes
                | Error::PageNotFound
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            Error::EmptyText | Error::BlankAuthorName => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// the message shown to visitors. internal failures stay in the logs.
    pub fn public_message(&self) -> String {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            "something went wrong on our end.".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(err = ?self, "an error occurred when handling request");
        }

        let message = self.public_message();

        match views::render(&ErrorView::new(status, &message)) {
            Ok(html) => (status, html).into_response(),
            Err(e) => {
                tracing::error!(err = ?e, "an error occurred when rendering error page");
                (status, message).into_response()
            }
        }
    }
}
