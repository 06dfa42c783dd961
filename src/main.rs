//! Rootly - houseplant care tracking service.
//!
//! # API Endpoints
//!
//! - `GET /species`, `GET /species/:name` - Species catalog
//! - `POST /plants`, `GET|DELETE /plants/:id` - Plant collection
//! - `PUT /plants/:id/name`, `POST /plants/:id/dead`, `PUT|DELETE /plants/:id/favorite`
//! - `POST /plants/:id/activities` - Record watering or fertilizing
//! - `GET /plants/:id/care` - Ideal conditions and next due dates
//! - `GET|POST /plants/:id/logs` - Growth journal
//! - `GET /users/:id/plants`, `GET /users/:id/favorites`, `GET /users/:id/todo`
//! - `GET /health` - Health check

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use rootly::api::{AppState, router};
use rootly::seed::{seed_demo, seed_species};
use rootly::storage::Storage;

/// Default port if not specified via environment variable.
const DEFAULT_PORT: u16 = 3000;

/// Default database path if not specified via environment variable.
const DEFAULT_DB_PATH: &str = "sqlite:rootly.db?mode=rwc";

/// Owner of the demo garden when `ROOTLY_SEED_DEMO` is set.
const DEMO_USER_ID: i64 = 1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("rootly=info".parse()?))
        .init();

    // Load configuration from environment
    let port: u16 = env::var("ROOTLY_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let db_url = env::var("ROOTLY_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let seed_demo_garden = env::var_os("ROOTLY_SEED_DEMO").is_some();

    info!(port, db_url = %db_url, "Starting Rootly server");

    let storage = Storage::new(&db_url).await?;
    seed_species(&storage).await?;
    if seed_demo_garden {
        seed_demo(&storage, DEMO_USER_ID).await?;
    }

    // The catalog is read-only for the lifetime of the process.
    let catalog = Arc::new(storage.load_catalog().await?);
    info!(species = catalog.len(), "Species catalog loaded");

    let state = AppState { storage, catalog };

    let app = router(state).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Rootly is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
