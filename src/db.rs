use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DbConfig;

/// Pool options for `cfg`. Connections open lazily and idle ones are
/// released after `max_idle_time`; `max_idle_conns` has no sqlx counterpart
/// (there is no idle-count cap), so it is only reported.
pub fn pool_options(cfg: &DbConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(cfg.max_open_conns)
        .min_connections(0)
        .idle_timeout(cfg.max_idle_time)
        .acquire_timeout(Duration::from_secs(5))
}

/// Opens the Postgres pool. The caller owns the returned handle and is
/// expected to `close()` it once nothing uses it anymore.
pub async fn connect(cfg: &DbConfig) -> anyhow::Result<PgPool> {
    let db = pool_options(cfg)
        .connect(&cfg.addr)
        .await
        .context("connect to database")?;

    tracing::info!(
        max_open = cfg.max_open_conns,
        max_idle = cfg.max_idle_conns,
        max_idle_enforced = false,
        idle_timeout = ?cfg.max_idle_time,
        "database connected"
    );
    Ok(db)
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}
