//! SchoolDiary HTTP server binary.
//!
//! Entry point for the REST API: builds the repository from the
//! environment, wires up the router, and serves until interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Run with the in-memory repository (default when DATABASE_URL is unset)
//! cargo run --bin school-diary-server
//!
//! # Run against an embedded SQLite database file
//! DATABASE_URL=school_diary.sqlite3 cargo run --bin school-diary-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `DATABASE_URL`: SQLite database file path (selects the SQLite backend)
//! - `REPOSITORY_TYPE`: `sqlite` or `local` (overrides the default choice)
//! - `RUST_LOG`: Log filter (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use school_diary::db::RepositoryFactory;
use school_diary::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting SchoolDiary HTTP server");

    // Explicit construction: one repository for the process lifetime,
    // passed down through AppState. The schema is ensured here, before
    // the first request can arrive.
    let repository = RepositoryFactory::create_from_env()?;
    info!("Repository initialized");

    let state = AppState::new(repository);
    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Dropping the repository closes the connection pool.
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
