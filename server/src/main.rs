use std::sync::Arc;

use anyhow::Context;
use todo_core::TodoService;
use todo_server::{telemetry, Config, SqliteStore};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init().context("installing tracing subscriber")?;
    let config = Config::from_env()?;

    let store = SqliteStore::connect(&config.database_url)
        .await
        .with_context(|| format!("opening database {}", config.database_url))?;
    let service = TodoService::new(Arc::new(store));

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    todo_server::run(listener, service).await?;
    Ok(())
}
