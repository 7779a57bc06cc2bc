use std::{net::SocketAddr, path::PathBuf, str::FromStr};

use anyhow::Context;
use axum::Router;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};
use tokio::net::TcpListener;

use crate::{
    constants::{DEFAULT_LISTEN_ADDR, DEFAULT_MAX_CONNECTIONS},
    routes, seed,
    telemetry::{self, TelemetryGuard},
    Data,
};

pub struct Server {
    listener: TcpListener,
    router: Router,
    db: Pool<Sqlite>,
    telemetry: TelemetryGuard,
}

impl Server {
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.listener.local_addr()?;
        tracing::info!("listening on http://{}", addr);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when serving requests"))?;

        tracing::info!("shutting down... closing database connections.");
        self.db.close().await;
        self.telemetry.shutdown();

        Ok(())
    }
}

async fn init_database() -> anyhow::Result<Pool<Sqlite>> {
    let db_url = std::env::var("DATABASE_URL").context("missing DATABASE_URL")?;

    let max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
        Ok(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("invalid DATABASE_MAX_CONNECTIONS {raw:?}"))?,
        Err(_) => DEFAULT_MAX_CONNECTIONS,
    };

    tracing::info!("initializing database connection...");
    let opts = SqliteConnectOptions::from_str(&db_url)
        .context("invalid DATABASE_URL")?
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);
    let db = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(opts)
        .await?;

    tracing::info!("running migrations...");
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("finished running migrations!");

    Ok(db)
}

async fn init_seed(data: &Data) -> anyhow::Result<()> {
    let seed_file = std::env::var("QUOTES_SEED_FILE").ok().map(PathBuf::from);

    match seed_file {
        Some(path) => {
            tracing::info!("seeding quotes from {}...", path.display());
            seed::seed_from_file(&data.store, &path).await?;
        }
        None => {
            tracing::debug!("no QUOTES_SEED_FILE set, not seeding quotes.");
        }
    }

    Ok(())
}

fn init_listen_addr() -> anyhow::Result<SocketAddr> {
    let raw = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());

    raw.parse::<SocketAddr>()
        .with_context(|| format!("invalid LISTEN_ADDR {raw:?}"))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(err = ?e, "an error occurred when listening for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(err = ?e, "an error occurred when listening for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("received shutdown signal.");
}

pub async fn init() -> anyhow::Result<Server> {
    let telemetry = telemetry::init_telemetry().context("failed to initialize telemetry")?;

    tracing::info!("initializing... please wait warmly.");

    let addr = init_listen_addr()?;
    let db = init_database().await?;
    let data = Data::new(db.clone());
    init_seed(&data).await?;

    let router = routes::router(data);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("couldn't bind to {addr}"))?;

    tracing::info!("finished initializing!");

    Ok(Server {
        listener,
        router,
        db,
        telemetry,
    })
}
