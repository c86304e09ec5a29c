use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use event_board::{
    config::{AppConfig, Config, LogFormat, StoreBackend},
    database::Database,
    store::{EventStore, InMemoryEventStore, PgEventStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing(&config.app);

    info!(environment = %config.app.environment, "Starting Event Board API");

    // Connect to the store
    let (store, db): (Arc<dyn EventStore>, Option<Database>) = match config.database.backend {
        StoreBackend::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .context("DATABASE_URL must be set")?;

            let db = match Database::new(url, config.database.pool_size).await {
                Ok(db) => db,
                Err(e) => {
                    error!("Database connection failed: {}", e);
                    return Err(e).context("Failed to connect to database");
                }
            };
            info!("Database connected");

            db.run_migrations()
                .await
                .context("Failed to run migrations")?;

            (Arc::new(PgEventStore::new(&db)) as Arc<dyn EventStore>, Some(db))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory event store, data will not survive a restart");
            (Arc::new(InMemoryEventStore::new()) as Arc<dyn EventStore>, None)
        }
    };

    let app = event_board::app(AppState::new(store, config.clone()));

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    if let Some(db) = db {
        db.close().await;
    }

    info!("Shutdown complete");
    Ok(())
}

fn init_tracing(app: &AppConfig) {
    let filter = EnvFilter::try_new(&app.rust_log).unwrap_or_else(|_| EnvFilter::new("info"));

    match app.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Received shutdown signal");
}
