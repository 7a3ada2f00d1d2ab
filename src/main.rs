// src/main.rs
mod config;
mod error;
mod forms;
mod models;
mod routes;
mod services;
mod session;
mod state;
mod store;
mod views;

use axum::{serve, Extension};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::routes::create_router;
use crate::services::auth::AuthService;
use crate::session::SessionKeys;
use crate::state::AppState;
use crate::store::postgres::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the subscriber so RUST_LOG from it applies.
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedback_app=debug,tower_http=debug,sqlx=warn".into()),
        )
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    let store = PgStore::new(pool);

    // `--reset` drops and recreates the schema, then exits.
    if std::env::args().skip(1).any(|arg| arg == "--reset") {
        store.reset().await?;
        info!("Database schema recreated");
        return Ok(());
    }
    store.migrate().await?;

    let app_state = Arc::new(AppState {
        store: Arc::new(store),
        auth: AuthService::new(config.bcrypt_cost),
        sessions: SessionKeys::new(&config.secret_key, config.session_ttl),
    });

    let app = create_router()
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Server running on {}", config.bind_addr);
    serve(listener, app).await?;

    Ok(())
}
