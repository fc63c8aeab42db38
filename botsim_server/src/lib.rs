#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! HTTP surface for running simulations.

mod error;
mod handlers;

use axum::{
    Router,
    routing::{get, post},
};
use botsim_conversation::Simulator;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub simulator: Arc<Simulator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthy", get(handlers::health_check))
        .route("/simulate", post(handlers::simulate))
        .route("/ws/:client_id", get(handlers::websocket_unsupported))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, simulator: Simulator) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Bot simulation API listening on {}", listener.local_addr()?);

    let app = router(AppState {
        simulator: Arc::new(simulator),
    });
    axum::serve(listener, app).await?;
    Ok(())
}
