//! Server entrypoint: load configuration, open the account store, build the
//! router and serve.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use meditation_center_backend::api;
use meditation_center_backend::auth::{AuthState, JwtCodec, UserStore};
use meditation_center_backend::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let accounts = Arc::new(
        UserStore::new(&config.database_path).context("failed to open account database")?,
    );
    let jwt = Arc::new(JwtCodec::new(&config.jwt));
    let state = AuthState::new(accounts, jwt);

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
