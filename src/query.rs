use futures::{stream::BoxStream, TryStreamExt};
use rand::Rng;

use crate::{
    error::Error,
    models::quotes::Quote,
    store::{self, QuoteStore},
};

/// the read side of the site: listing, lookup and random picks.
#[derive(Clone, Debug)]
pub struct QueryService {
    store: QuoteStore,
}

impl QueryService {
    pub fn new(store: QuoteStore) -> Self {
        Self { store }
    }

    /// every quote whose text contains `query`, published quotes first and then by id.
    /// an absent or empty query lists everything.
    pub fn stream(&self, query: Option<&str>) -> BoxStream<'_, Result<Quote, Error>> {
        let pattern = query
            .filter(|query| !query.is_empty())
            .map(|query| format!("%{}%", escape_like(query)));

        self.store.stream_matching(pattern)
    }

    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: Option<&str>) -> Result<Vec<Quote>, Error> {
        let quotes: Vec<Quote> = self.stream(query).try_collect().await?;

        tracing::debug!(count = quotes.len(), "listed quotes");

        Ok(quotes)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Quote, Error> {
        self.store.get_quote(id).await
    }

    /// a uniformly chosen published quote. the count and the fetch share one transaction, so a
    /// concurrent delete can't leave the offset pointing past the end.
    #[tracing::instrument(skip(self))]
    pub async fn random(&self) -> Result<Quote, Error> {
        let mut tx = self.store.begin().await?;

        let count = store::count_published(&mut tx).await?;
        let offset = pick_offset(count, &mut rand::thread_rng())?;

        let quote = store::published_at(&mut tx, offset)
            .await?
            .ok_or(Error::NoPublishedQuotes)?;

        tx.commit().await?;

        Ok(quote)
    }
}

/// picks an offset uniformly from `0..count`.
pub fn pick_offset<R: Rng + ?Sized>(count: i64, rng: &mut R) -> Result<i64, Error> {
    if count <= 0 {
        return Err(Error::NoPublishedQuotes);
    }

    Ok(rng.gen_range(0..count))
}

/// escapes the `LIKE` wildcards so user input only ever matches literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());

    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }

        escaped.push(c);
    }

    escaped
}
