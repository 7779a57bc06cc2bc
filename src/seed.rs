use std::{collections::HashMap, path::Path};

use anyhow::Context;
use serde::Deserialize;

use crate::{
    models::quotes::NewQuote,
    store::{insert_author, insert_quote, QuoteStore},
};

#[derive(Debug, Deserialize)]
struct SeedFile {
    quotes: Vec<SeedQuote>,
}

#[derive(Debug, Deserialize)]
struct SeedQuote {
    text: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    is_draft: bool,
}

/// fills an empty store from a json seed file. returns how many quotes were added, which is zero
/// when the store already had quotes in it. the file goes in as a single transaction, so a bad
/// entry leaves the store empty.
#[tracing::instrument(skip(store))]
pub async fn seed_from_file(store: &QuoteStore, path: &Path) -> anyhow::Result<usize> {
    let existing = store.count_quotes().await?;
    if existing > 0 {
        tracing::info!(existing, "store already has quotes, skipping seed file.");
        return Ok(0);
    }

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("couldn't read seed file {}", path.display()))?;

    let seed: SeedFile = serde_json::from_str(&raw)
        .with_context(|| format!("couldn't parse seed file {}", path.display()))?;

    let mut authors: HashMap<String, i64> = HashMap::new();
    let total = seed.quotes.len();

    let mut tx = store.begin().await?;

    for (idx, quote) in seed.quotes.into_iter().enumerate() {
        let mut new_quote = NewQuote::new(quote.text);
        new_quote.is_draft = quote.is_draft;

        if let Some(name) = quote.author.filter(|name| !name.trim().is_empty()) {
            let author_id = match authors.get(&name) {
                Some(id) => *id,
                None => {
                    let author = insert_author(&mut tx, Some(&name)).await?;
                    authors.insert(name, author.id);
                    author.id
                }
            };

            new_quote = new_quote.by(author_id);
        }

        insert_quote(&mut tx, new_quote)
            .await
            .with_context(|| format!("couldn't add quote #{} from seed file", idx + 1))?;
    }

    tx.commit().await.context("couldn't commit seed file")?;

    tracing::info!(quotes = total, authors = authors.len(), "finished seeding quotes!");

    Ok(total)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use sqlx::{Pool, Sqlite};

    use super::*;
    use crate::models::authors::UNKNOWN_AUTHOR;

    fn seed_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[sqlx::test]
    async fn seeds_quotes_and_shares_authors(db: Pool<Sqlite>) {
        let store = QuoteStore::new(db);
        let file = seed_file(
            r#"{
                "quotes": [
                    { "text": "I think, therefore I am.", "author": "Descartes" },
                    { "text": "Doubt is the origin of wisdom.", "author": "Descartes", "is_draft": true },
                    { "text": "Nobody knows who said this." }
                ]
            }"#,
        );

        let added = seed_from_file(&store, file.path()).await.unwrap();
        assert_eq!(added, 3);

        let quotes = store.all_quotes().await.unwrap();
        assert_eq!(quotes[0].author_name, "Descartes");
        assert_eq!(quotes[0].author_id, quotes[1].author_id);
        assert!(quotes[1].is_draft);
        assert_eq!(quotes[2].author_name, UNKNOWN_AUTHOR);
        assert_eq!(quotes[2].author_id, None);
    }

    #[sqlx::test]
    async fn skips_non_empty_store(db: Pool<Sqlite>) {
        let store = QuoteStore::new(db);
        store
            .create_quote(NewQuote::new("already here"))
            .await
            .unwrap();
        let file = seed_file(r#"{ "quotes": [{ "text": "new" }] }"#);

        assert_eq!(seed_from_file(&store, file.path()).await.unwrap(), 0);
        assert_eq!(store.count_quotes().await.unwrap(), 1);
    }

    #[sqlx::test]
    async fn reports_bad_seed_files(db: Pool<Sqlite>) {
        let store = QuoteStore::new(db);

        let malformed = seed_file("{ not json");
        let err = seed_from_file(&store, malformed.path()).await.unwrap_err();
        assert!(err.to_string().contains("couldn't parse seed file"));

        let empty_text = seed_file(r#"{ "quotes": [{ "text": "ok" }, { "text": "  " }] }"#);
        let err = seed_from_file(&store, empty_text.path()).await.unwrap_err();
        assert!(err.to_string().contains("quote #2"));
    }

    #[sqlx::test]
    async fn failed_seed_leaves_store_empty(db: Pool<Sqlite>) {
        let store = QuoteStore::new(db);

        let broken = seed_file(
            r#"{ "quotes": [{ "text": "ok", "author": "A" }, { "text": "  " }] }"#,
        );
        assert!(seed_from_file(&store, broken.path()).await.is_err());
        assert_eq!(store.count_quotes().await.unwrap(), 0);

        // the store is still empty, so the corrected file is picked up on the next start.
        let fixed = seed_file(
            r#"{ "quotes": [{ "text": "ok", "author": "A" }, { "text": "fine" }] }"#,
        );
        assert_eq!(seed_from_file(&store, fixed.path()).await.unwrap(), 2);

        let quotes = store.all_quotes().await.unwrap();
        assert_eq!(quotes[0].author_name, "A");
        assert_eq!(quotes[1].text, "fine");
    }
}
