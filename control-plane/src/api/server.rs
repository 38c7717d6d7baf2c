use std::sync::Arc;

use axum::http::Method;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::admission::Admission;
use crate::inventory::Inventory;
use crate::scheduler::Scheduler;

use super::handlers;

/// Shared application state accessible to every handler and to the
/// failure detector task spawned alongside the server.
pub struct AppState {
    pub inventory: Arc<Inventory>,
    pub scheduler: Arc<Scheduler>,
    pub admission: Admission,
}

/// Builds the full router: thin routes, permissive CORS, request
/// tracing. No business logic lives here, every handler delegates
/// straight to `Admission`/`Inventory`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/nodes", post(handlers::nodes::create_node).get(handlers::nodes::list_nodes))
        .route("/nodes/:id/stop", post(handlers::nodes::stop_node))
        .route("/nodes/:id/restart", post(handlers::nodes::restart_node))
        .route("/nodes/:id", delete(handlers::nodes::delete_node))
        .route("/pods", post(handlers::pods::launch_pod).get(handlers::pods::list_pods))
        .route("/pods/:id", delete(handlers::pods::delete_pod))
        .route("/pods/:id/restart", post(handlers::pods::restart_pod))
        .route("/heartbeat", post(handlers::heartbeat::receive_heartbeat))
        .route("/scheduler", post(handlers::scheduler::set_scheduler))
        .route("/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
