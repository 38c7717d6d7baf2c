use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::models::{LaunchPodRequest, LaunchPodResponse, PodActionResponse};
use crate::api::server::AppState;
use crate::error::{ControlPlaneError, Result};
use crate::inventory::Pod;

/// Wire representation of a pod with `CreatedAt` encoded as RFC 3339,
/// per the HTTP surface contract.
#[derive(Debug, Serialize)]
pub struct PodView {
    pub id: String,
    pub cpu_required: u32,
    pub node_id: String,
    pub status: crate::inventory::PodStatus,
    pub created_at: String,
}

impl From<Pod> for PodView {
    fn from(pod: Pod) -> Self {
        Self {
            id: pod.id,
            cpu_required: pod.cpu_required,
            node_id: pod.node_id,
            status: pod.status,
            created_at: pod.created_at.to_rfc3339(),
        }
    }
}

pub async fn launch_pod(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LaunchPodRequest>,
) -> Result<(StatusCode, Json<LaunchPodResponse>)> {
    if req.cpu_required <= 0 {
        return Err(ControlPlaneError::Validation("cpuRequired must be positive".to_string()));
    }
    let (pod_id, node_id) = state.admission.launch_pod(req.cpu_required as u32).await?;
    Ok((
        StatusCode::CREATED,
        Json(LaunchPodResponse {
            message: format!("pod {pod_id} launched on node {node_id}"),
            pod_id,
            node_id,
        }),
    ))
}

pub async fn list_pods(State(state): State<Arc<AppState>>) -> Json<HashMap<String, PodView>> {
    let pods = state.inventory.snapshot_pods().await;
    Json(pods.into_iter().map(|(id, pod)| (id, PodView::from(pod))).collect())
}

pub async fn delete_pod(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PodActionResponse>> {
    state.admission.delete_pod(&id).await?;
    Ok(Json(PodActionResponse { message: format!("pod {id} deleted"), pod_id: id }))
}

pub async fn restart_pod(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PodActionResponse>> {
    state.admission.restart_pod(&id).await?;
    Ok(Json(PodActionResponse { message: format!("pod {id} restarting"), pod_id: id }))
}
