use std::sync::Arc;

mod app;
mod config;
mod db;
mod error;
mod state;
mod store;
mod users;

use crate::{config::AppConfig, state::AppState, store::Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "sapa_telemed=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);

    let db = db::connect(&config.db).await?;
    db::migrate(&db).await?;

    let state = AppState::new(config.clone(), Storage::new(db.clone()));
    let result = app::serve(app::build_app(state), config.addr).await;

    db.close().await;
    tracing::info!("database pool closed");
    result
}
