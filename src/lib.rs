use query::QueryService;
use sqlx::{Pool, Sqlite};
use store::QuoteStore;

pub mod constants;
pub mod error;
pub mod init;
pub mod models;
pub mod query;
pub mod routes;
pub mod seed;
pub mod store;
pub mod telemetry;
pub mod views;

/// shared state handed to every route.
#[derive(Clone, Debug)]
pub struct Data {
    store: QuoteStore,
    quotes: QueryService,
}

impl Data {
    pub fn new(db: Pool<Sqlite>) -> Self {
        let store = QuoteStore::new(db);
        let quotes = QueryService::new(store.clone());

        Self { store, quotes }
    }

    pub fn store(&self) -> &QuoteStore {
        &self.store
    }

    pub fn quotes(&self) -> &QueryService {
        &self.quotes
    }
}
