//! Crisis Drill API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use crisis_api::config::AppConfig;
use crisis_api::error::AppError;
use crisis_api::sessions::SessionRegistry;
use crisis_api::state::AppState;
use crisis_api::telemetry;
use crisis_content::application::command_handlers::handle_import_pack;
use crisis_content::domain::commands::ImportScenarioPack;
use crisis_core::clock::SystemClock;
use crisis_progression::media::{MediaProvider, NoMedia, StaticMediaProvider};
use crisis_store::pg_game_store::PgGameStore;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let tracer_provider = telemetry::init(config.otlp_endpoint.as_deref())?;

    info!("Starting Crisis Drill API server");

    // Create database connection pool and bring the schema up to date.
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(sqlx::Error::from)?;

    let store = PgGameStore::new(pool);

    if let Some(path) = &config.seed_pack_path {
        let source = tokio::fs::read_to_string(path).await?;
        let command = ImportScenarioPack {
            correlation_id: Uuid::new_v4(),
            source,
        };
        match handle_import_pack(&command, &store, &store, &store).await {
            Ok(summary) => info!(path = %path.display(), ?summary, "seed pack imported"),
            Err(err) => warn!(path = %path.display(), error = %err, "seed pack not imported"),
        }
    }

    let media: Arc<dyn MediaProvider> = match &config.media_base_url {
        Some(base) => Arc::new(StaticMediaProvider::new(base.clone())),
        None => Arc::new(NoMedia),
    };
    let app_state = AppState::from_store(store, Arc::new(SystemClock), media, config.settings);
    tokio::spawn(purge_idle_sessions(app_state.sessions.clone()));

    // TODO: restrict CORS to the web client origin once it has a fixed host.
    let app = crisis_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry::shutdown(tracer_provider);
    Ok(())
}

async fn purge_idle_sessions(sessions: SessionRegistry) {
    let mut ticker = tokio::time::interval(sessions.idle_timeout() / 2);
    loop {
        ticker.tick().await;
        let purged = sessions.purge_idle();
        if purged > 0 {
            info!(purged, "dropped idle sessions");
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
