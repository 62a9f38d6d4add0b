use std::net::SocketAddr;

use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bank_ledger_backend::db::DbConnection;
use bank_ledger_backend::{router, AppState};

// Defaults, overridable through the BANK_* environment variables
const DATABASE_URL: &str = "sqlite:bank.db";
const BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let database_url =
        std::env::var("BANK_DATABASE_URL").unwrap_or_else(|_| DATABASE_URL.to_string());
    info!("Setting up database at {}", database_url);
    let db = DbConnection::new(&database_url).await?;

    // Set up our application state
    let state = AppState::new(db);

    // CORS setup to allow browser clients to make requests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = router(state).layer(cors);

    // Start the server
    let addr: SocketAddr = std::env::var("BANK_BIND_ADDR")
        .unwrap_or_else(|_| BIND_ADDR.to_string())
        .parse()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
