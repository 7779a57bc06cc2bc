use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use sqlx::{Pool, Sqlite, SqliteConnection, Transaction};
use time::OffsetDateTime;

use crate::{
    error::Error,
    models::{
        authors::{Author, UNKNOWN_AUTHOR},
        quotes::{NewQuote, Quote},
    },
};

/// durable storage for quotes and the authors they may point at.
///
/// the pool-level methods each run in their own transaction. multi-step writes (like seeding)
/// take a transaction from [`QuoteStore::begin`] and call the free functions below on it.
#[derive(Clone, Debug)]
pub struct QuoteStore {
    db: Pool<Sqlite>,
}

impl QuoteStore {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, Error> {
        let tx = self.db.begin().await.inspect_err(
            |e| tracing::error!(err = ?e, "an error occurred when starting a transaction"),
        )?;

        Ok(tx)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_author(&self, name: Option<&str>) -> Result<Author, Error> {
        let mut conn = self.db.acquire().await?;

        insert_author(&mut conn, name).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_author(&self, id: i64) -> Result<Author, Error> {
        let mut conn = self.db.acquire().await?;

        fetch_author(&mut conn, id).await
    }

    /// deletes an author together with every quote that references it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_author(&self, id: i64) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
                DELETE FROM authors
                WHERE id = $1;
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await
        .inspect_err(|e| {
            tracing::error!(err = ?e, id = %id, "an error occurred when deleting author");
        })?;

        if result.rows_affected() == 0 {
            return Err(Error::AuthorNotFound(id));
        }

        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub async fn create_quote(&self, quote: NewQuote) -> Result<Quote, Error> {
        let mut tx = self.begin().await?;

        let created = insert_quote(&mut tx, quote).await?;

        tx.commit().await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_quote(&self, id: i64) -> Result<Quote, Error> {
        sqlx::query_as::<_, Quote>(
            r#"
                SELECT
                    id, text, author_name, is_draft, created_at, author_id
                FROM quotes
                WHERE id = $1;
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .inspect_err(|e| {
            tracing::error!(err = ?e, id = %id, "an error occurred when fetching quote");
        })?
        .ok_or(Error::QuoteNotFound(id))
    }

    #[tracing::instrument(skip_all)]
    pub async fn all_quotes(&self) -> Result<Vec<Quote>, Error> {
        let quotes = sqlx::query_as::<_, Quote>(
            r#"
                SELECT
                    id, text, author_name, is_draft, created_at, author_id
                FROM quotes
                ORDER BY id;
            "#,
        )
        .fetch_all(&self.db)
        .await
        .inspect_err(
            |e| tracing::error!(err = ?e, "an error occurred when fetching quotes from database"),
        )?;

        Ok(quotes)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_quote(&self, id: i64) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
                DELETE FROM quotes
                WHERE id = $1;
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await
        .inspect_err(|e| {
            tracing::error!(err = ?e, id = %id, "an error occurred when deleting quote");
        })?;

        if result.rows_affected() == 0 {
            return Err(Error::QuoteNotFound(id));
        }

        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub async fn count_quotes(&self) -> Result<i64, Error> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quotes;")
            .fetch_one(&self.db)
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when counting quotes"))?;

        Ok(count)
    }

    /// lazily yields quotes whose text matches `pattern` (a `LIKE` pattern using `\` as the
    /// escape character), published quotes first. `None` matches every quote.
    pub fn stream_matching(&self, pattern: Option<String>) -> BoxStream<'_, Result<Quote, Error>> {
        sqlx::query_as::<_, Quote>(
            r#"
                SELECT
                    id, text, author_name, is_draft, created_at, author_id
                FROM quotes
                WHERE $1 IS NULL OR text LIKE $1 ESCAPE '\'
                ORDER BY is_draft, id;
            "#,
        )
        .bind(pattern)
        .fetch(&self.db)
        .map_err(Error::from)
        .inspect_err(
            |e| tracing::error!(err = ?e, "an error occurred when fetching quotes from database"),
        )
        .boxed()
    }
}

#[tracing::instrument(skip(conn))]
pub async fn insert_author(
    conn: &mut SqliteConnection,
    name: Option<&str>,
) -> Result<Author, Error> {
    let name = match name {
        Some(name) if name.trim().is_empty() => return Err(Error::BlankAuthorName),
        Some(name) => name,
        None => UNKNOWN_AUTHOR,
    };

    let author = sqlx::query_as::<_, Author>(
        r#"
            INSERT INTO
                authors (name)
            VALUES
                ($1)
            RETURNING
                id, name;
        "#,
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, name = %name, "an error occurred when adding author");
    })?;

    Ok(author)
}

#[tracing::instrument(skip(conn))]
pub async fn fetch_author(conn: &mut SqliteConnection, id: i64) -> Result<Author, Error> {
    sqlx::query_as::<_, Author>(
        r#"
            SELECT
                id, name
            FROM authors
            WHERE id = $1;
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, id = %id, "an error occurred when fetching author");
    })?
    .ok_or(Error::AuthorNotFound(id))
}

/// inserts a quote, snapshotting the author's name when none was given. an `author_id` that
/// doesn't exist (or stopped existing) is reported as [`Error::AuthorNotFound`].
#[tracing::instrument(skip_all)]
pub async fn insert_quote(conn: &mut SqliteConnection, quote: NewQuote) -> Result<Quote, Error> {
    if quote.text.trim().is_empty() {
        return Err(Error::EmptyText);
    }

    let author_name = match (quote.author_name, quote.author_id) {
        (Some(name), _) if !name.trim().is_empty() => name,
        (_, Some(author_id)) => fetch_author(conn, author_id).await?.name,
        _ => UNKNOWN_AUTHOR.to_string(),
    };

    let created = sqlx::query_as::<_, Quote>(
        r#"
            INSERT INTO
                quotes (text, author_name, is_draft, created_at, author_id)
            VALUES
                ($1, $2, $3, $4, $5)
            RETURNING
                id, text, author_name, is_draft, created_at, author_id;
        "#,
    )
    .bind(&quote.text)
    .bind(&author_name)
    .bind(quote.is_draft)
    .bind(OffsetDateTime::now_utc())
    .bind(quote.author_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        let fk_violation = e
            .as_database_error()
            .is_some_and(|db_err| db_err.is_foreign_key_violation());

        match quote.author_id {
            Some(author_id) if fk_violation => Error::AuthorNotFound(author_id),
            _ => Error::Database(e),
        }
    })
    .inspect_err(|e| {
        tracing::error!(err = ?e, text = %quote.text, "an error occurred when adding quote");
    })?;

    tracing::debug!(id = created.id, is_draft = created.is_draft, "added quote");

    Ok(created)
}

#[tracing::instrument(skip(conn))]
pub async fn count_published(conn: &mut SqliteConnection) -> Result<i64, Error> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
            SELECT COUNT(*)
            FROM quotes
            WHERE is_draft = FALSE;
        "#,
    )
    .fetch_one(&mut *conn)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, "an error occurred when counting published quotes");
    })?;

    Ok(count)
}

/// the published quote at `offset` in id order.
#[tracing::instrument(skip(conn))]
pub async fn published_at(
    conn: &mut SqliteConnection,
    offset: i64,
) -> Result<Option<Quote>, Error> {
    let quote = sqlx::query_as::<_, Quote>(
        r#"
            SELECT
                id, text, author_name, is_draft, created_at, author_id
            FROM quotes
            WHERE is_draft = FALSE
            ORDER BY id
            LIMIT 1 OFFSET $1;
        "#,
    )
    .bind(offset)
    .fetch_optional(&mut *conn)
    .await
    .inspect_err(|e| {
        tracing::error!(
            err = ?e,
            offset = %offset,
            "an error occurred when fetching published quote"
        );
    })?;

    Ok(quote)
}
