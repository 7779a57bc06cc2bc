//! askama view models for the html pages.

use askama::Template;
use axum::{http::StatusCode, response::Html};
use time::macros::format_description;

use crate::{error::Error, models::quotes::Quote};

pub fn render<T: Template>(template: &T) -> Result<Html<String>, Error> {
    let html = template
        .render()
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when rendering template"))?;

    Ok(Html(html))
}

#[derive(Clone, Debug)]
pub struct QuoteRow {
    pub id: i64,
    pub text: String,
    pub author_name: String,
    pub is_draft: bool,
    pub created_on: String,
}

impl From<Quote> for QuoteRow {
    fn from(quote: Quote) -> Self {
        Self {
            id: quote.id,
            created_on: quote
                .created_at
                .format(format_description!("[year]-[month]-[day]"))
                .unwrap_or_default(),
            text: quote.text,
            author_name: quote.author_name,
            is_draft: quote.is_draft,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexView {
    pub quotes: Vec<QuoteRow>,
    pub query: String,
}

impl IndexView {
    pub fn new(quotes: Vec<Quote>, query: Option<&str>) -> Self {
        Self {
            quotes: quotes.into_iter().map(QuoteRow::from).collect(),
            query: query.unwrap_or_default().to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "single.html")]
pub struct QuoteView {
    pub quote: QuoteRow,
}

impl QuoteView {
    pub fn new(quote: Quote) -> Self {
        Self {
            quote: quote.into(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorView {
    pub status: u16,
    pub reason: String,
    pub message: String,
}

impl ErrorView {
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Error").to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn quote(id: i64, text: &str, is_draft: bool) -> Quote {
        Quote {
            id,
            text: text.to_string(),
            author_name: "Unknown".to_string(),
            is_draft,
            created_at: datetime!(2024-03-05 12:00 UTC),
            author_id: None,
        }
    }

    #[test]
    fn index_escapes_quote_text() {
        let view = IndexView::new(vec![quote(1, "<script>alert(1)</script>", false)], None);

        let html = render(&view).unwrap().0;

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn index_marks_drafts_and_keeps_query() {
        let view = IndexView::new(
            vec![quote(1, "published", false), quote(2, "unfinished", true)],
            Some("fin"),
        );

        let html = render(&view).unwrap().0;

        assert!(html.contains("href=\"/2\""));
        assert!(html.contains("<span class=\"badge\">draft</span>"));
        assert!(html.contains("value=\"fin\""));
    }

    #[test]
    fn empty_index_says_so() {
        let html = render(&IndexView::new(vec![], Some("xyz"))).unwrap().0;

        assert!(html.contains("no quotes found"));
    }

    #[test]
    fn single_quote_shows_author_and_date() {
        let mut q = quote(9, "know thyself", false);
        q.author_name = "Socrates".to_string();

        let html = render(&QuoteView::new(q)).unwrap().0;

        assert!(html.contains("know thyself"));
        assert!(html.contains("Socrates"));
        assert!(html.contains("2024-03-05"));
    }

    #[test]
    fn error_page_shows_status() {
        let html = render(&ErrorView::new(StatusCode::NOT_FOUND, "quote 3 does not exist."))
            .unwrap()
            .0;

        assert!(html.contains("404"));
        assert!(html.contains("Not Found"));
        assert!(html.contains("quote 3 does not exist."));
    }
}
