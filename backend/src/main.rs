//! Dashboard entry-point: reads configuration, prepares storage and serves
//! the REST API.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::net::SocketAddr;

use actix_web::web;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use dashboard::inbound::http::health::HealthState;
use dashboard::inbound::http::session_config::{BuildMode, SessionSettings};
use dashboard::outbound::persistence::{
    DEFAULT_MAX_CONNECTIONS, DbPool, PoolConfig, run_pending_migrations,
};
use server::{ServerConfig, create_server};

/// `dashboard` command arguments.
#[derive(Debug, Parser)]
#[command(name = "dashboard", about = "Multi-tenant blog dashboard API", version)]
struct CliArgs {
    /// Socket address to listen on.
    #[arg(long = "bind", env = "DASHBOARD_BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: SocketAddr,
    /// PostgreSQL connection URL. Without it, data lives in memory only.
    #[arg(long = "database-url", env = "DATABASE_URL", value_name = "url")]
    database_url: Option<String>,
    /// Upper bound on pooled database connections.
    #[arg(long = "db-max-connections", env = "DASHBOARD_DB_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    db_max_connections: u32,
}

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let args = CliArgs::parse();
    let session = SessionSettings::from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(fingerprint = %session.fingerprint(), "session key loaded");

    let mut config = ServerConfig::new(session, args.bind_addr);
    if let Some(database_url) = args.database_url {
        config = config.with_db_pool(prepare_database(database_url, args.db_max_connections).await?);
    } else {
        warn!("DATABASE_URL not set; accounts and organizations are kept in memory");
    }
    info!(bind_addr = %args.bind_addr, storage = config.storage_label(), "starting server");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).wrap_err("failed to start server")?;
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome.wrap_err("server terminated with an error")
}

async fn prepare_database(database_url: String, max_connections: u32) -> Result<DbPool> {
    let migrations_url = database_url.clone();
    let applied = web::block(move || run_pending_migrations(&migrations_url))
        .await
        .map_err(|error| eyre!("migration task failed: {error}"))?
        .wrap_err("failed to apply migrations")?;
    info!(applied, "database schema up to date");

    DbPool::new(PoolConfig::new(database_url).with_max_size(max_connections))
        .await
        .map_err(|error| eyre!("failed to create database pool: {}", error.into_message()))
}
