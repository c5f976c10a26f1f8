//! HTTP router setup.

use crate::handlers;
use crate::middleware::{count_request, inject_request_id, require_wallet};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Mutating requests block on a human signing prompt plus finality
/// polling, so the request timeout must exceed both.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);
const MAX_CONCURRENT_REQUESTS: usize = 256;

/// Create the application router. Wallet-required pages sit behind the
/// cookie guard; everything else is public.
pub fn create(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/explore", get(handlers::explore))
        .route("/explore/purchase", post(handlers::purchase))
        .route("/mint", get(handlers::user_nfts).post(handlers::mint))
        .route("/mint/list", post(handlers::list_for_sale))
        .route("/purchased", get(handlers::purchased))
        .route("/purchased/transfer", post(handlers::transfer))
        .route("/donate", get(handlers::creators).post(handlers::donate))
        .route("/stats", get(handlers::stats))
        .route_layer(axum::middleware::from_fn(require_wallet));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/wallet/connect", post(handlers::connect))
        .route("/wallet/disconnect", post(handlers::disconnect))
        .route("/initialize", post(handlers::initialize))
        .merge(protected)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            count_request,
        ))
        .layer(axum::middleware::from_fn(inject_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .with_state(state)
}
