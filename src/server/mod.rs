// ABOUTME: HTTP API over the problems table
// ABOUTME: Builds the axum router around a shared repository and serves it until Ctrl+C

pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;

use crate::store::ProblemRepository;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ProblemRepository>,
}

/// Build the API router.
///
/// Routes:
/// - `POST /problems/` create
/// - `GET /problems/` list with optional `difficulty_level` / `problem_type`
/// - `GET /problems/search/?problem_name=` substring search
/// - `GET /problems/{id}` lookup
pub fn router(repo: Arc<dyn ProblemRepository>) -> Router {
    Router::new()
        .route(
            "/problems/",
            get(handlers::list_problems).post(handlers::create_problem),
        )
        .route(
            "/problems",
            get(handlers::list_problems).post(handlers::create_problem),
        )
        .route("/problems/search/", get(handlers::search_problems))
        .route("/problems/search", get(handlers::search_problems))
        .route("/problems/:id", get(handlers::get_problem))
        .with_state(AppState { repo })
}

/// Serve the API on `addr` until Ctrl+C.
pub async fn serve(addr: SocketAddr, repo: Arc<dyn ProblemRepository>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Problems API listening on http://{}", addr);

    axum::serve(listener, router(repo))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await
        .context("HTTP server exited with error")?;

    Ok(())
}
