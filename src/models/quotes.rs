use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, sqlx::FromRow)]
pub struct Quote {
    pub id: i64,
    pub text: String,
    /// snapshot of the attribution taken when the quote was created.
    pub author_name: String,
    pub is_draft: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub author_id: Option<i64>,
}

/// a quote that has not been stored yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewQuote {
    pub text: String,
    pub author_name: Option<String>,
    pub is_draft: bool,
    pub author_id: Option<i64>,
}

impl NewQuote {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn draft(mut self) -> Self {
        self.is_draft = true;
        self
    }

    pub fn by(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn attributed_to(mut self, author_name: impl Into<String>) -> Self {
        self.author_name = Some(author_name.into());
        self
    }
}
