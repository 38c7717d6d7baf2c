use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::api::models::{HeartbeatRequest, HeartbeatResponse};
use crate::api::server::AppState;
use crate::error::Result;
use crate::inventory::NodeStatus;

/// The control plane's own pod set for the node is the single source of
/// truth. The request's `pods` field is accepted but not trusted; only
/// `status` is taken verbatim. The response's `pods` always reflects
/// our own record, which the agent then adopts as its local roster.
pub async fn receive_heartbeat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HeartbeatRequest>,
) -> Result<Json<HeartbeatResponse>> {
    let reported_status = req.status.parse().unwrap_or(NodeStatus::Healthy);
    let pods = state.inventory.stamp_heartbeat(&req.node_id, reported_status).await?;
    Ok(Json(HeartbeatResponse { pods }))
}
