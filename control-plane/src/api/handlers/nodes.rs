use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::models::{CreateNodeResponse, NodeActionResponse};
use crate::api::server::AppState;
use crate::error::{ControlPlaneError, Result};
use crate::inventory::Node;

use super::super::models::CreateNodeRequest;

pub async fn create_node(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateNodeRequest>,
) -> Result<(StatusCode, Json<CreateNodeResponse>)> {
    if req.cpu_cores <= 0 {
        return Err(ControlPlaneError::Validation("cpuCores must be positive".to_string()));
    }
    let node_id = state.admission.create_node(req.cpu_cores as u32).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateNodeResponse { message: format!("node {node_id} added"), node_id }),
    ))
}

pub async fn list_nodes(State(state): State<Arc<AppState>>) -> Json<HashMap<String, Node>> {
    Json(state.inventory.snapshot_nodes().await)
}

pub async fn stop_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<NodeActionResponse>> {
    state.admission.stop_node(&id).await?;
    Ok(Json(NodeActionResponse { message: format!("node {id} stopped"), node_id: id }))
}

pub async fn restart_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<NodeActionResponse>> {
    state.admission.restart_node(&id).await?;
    Ok(Json(NodeActionResponse { message: format!("node {id} restarting"), node_id: id }))
}

pub async fn delete_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<NodeActionResponse>> {
    state.admission.delete_node(&id).await?;
    Ok(Json(NodeActionResponse { message: format!("node {id} deleted"), node_id: id }))
}
