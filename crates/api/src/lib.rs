//! HTTP ingress for the order pipeline.
//!
//! Exposes order creation (routed through the mediator), read-only order
//! queries against the store, a health check and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use mediator::{
    LogSmsGateway, MediatorConfig, NotificationGateway, OrderMediator, ProcessedCounter,
};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R, N>(state: Arc<AppState<R, N>>, metrics_handle: PrometheusHandle) -> Router
where
    R: OrderRepository + 'static,
    N: NotificationGateway + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<R, N>))
        .route("/orders/count", get(routes::orders::count::<R, N>))
        .route("/orders/{order_id}/status", get(routes::orders::status::<R, N>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds application state around an explicit store and notification
/// gateway.
pub fn create_state<R, N>(repository: R, notifier: N, config: MediatorConfig) -> Arc<AppState<R, N>>
where
    R: OrderRepository + 'static,
    N: NotificationGateway + 'static,
{
    let mediator = OrderMediator::new(repository, notifier, ProcessedCounter::new(), config);
    Arc::new(AppState {
        mediator: Arc::new(mediator),
    })
}

/// Creates the default application state: the given store plus an SMS
/// gateway that logs outbound messages.
pub fn create_default_state<R: OrderRepository + 'static>(
    repository: R,
    config: &Config,
) -> Arc<AppState<R, LogSmsGateway>> {
    let notifier = LogSmsGateway::new(config.sms_source_address.clone());
    create_state(repository, notifier, config.mediator_config())
}
