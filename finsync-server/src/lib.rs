//! HTTP surface for finsync.
//!
//! Four workflow endpoints plus a health check, each a thin wrapper around
//! one `finsync_core` service.

use std::{future::Future, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{MatchedPath, Request},
    routing::{get, post},
    Router,
};
use finsync_core::FinsyncContext;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod endpoints;
mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{BudgetResponse, GetTransactionsRequest, MessageResponse};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub context: Arc<FinsyncContext>,
}

impl AppState {
    pub fn new(context: Arc<FinsyncContext>) -> Self {
        Self { context }
    }
}

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route(
            endpoints::CREATE_PUBLIC_TOKENS,
            post(handlers::create_public_tokens),
        )
        .route(
            endpoints::EXCHANGE_PUBLIC_TOKENS,
            post(handlers::exchange_public_tokens),
        )
        .route(endpoints::GET_TRANSACTIONS, post(handlers::get_transactions))
        .route(
            endpoints::CALCULATE_MONTHLY_BUDGET,
            get(handlers::calculate_monthly_budget).post(handlers::calculate_monthly_budget),
        )
        .route(endpoints::HEALTH, get(handlers::health))
        .with_state(state);

    add_tracing_layer(router)
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::info_span!("request", %method, %uri, matched_path)
        })
        // Failures are logged with their cause by `ApiError`
        .on_failure(());

    router.layer(tracing_layer)
}

/// Serve the API on `addr` until `shutdown` resolves.
pub async fn serve<F>(context: Arc<FinsyncContext>, addr: &str, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Could not bind to {}", addr))?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(AppState::new(context)))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
