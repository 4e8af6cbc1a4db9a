use std::path::Path;

use tracing_subscriber::EnvFilter;

use todo_server::config::Config;
use todo_server::{app, AppState, Db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let config = Config::from_env();
    let db = Db::open(Path::new(&config.database_path))?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, db = %config.database_path, "todo server listening");

    axum::serve(listener, app(AppState { db })).await?;
    Ok(())
}
