use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateNodeRequest {
    #[serde(rename = "cpuCores")]
    pub cpu_cores: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateNodeResponse {
    pub message: String,
    #[serde(rename = "nodeId")]
    pub node_id: String,
}

#[derive(Debug, Serialize)]
pub struct NodeActionResponse {
    pub message: String,
    #[serde(rename = "nodeId")]
    pub node_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LaunchPodRequest {
    #[serde(rename = "cpuRequired")]
    pub cpu_required: i64,
}

#[derive(Debug, Serialize)]
pub struct LaunchPodResponse {
    pub message: String,
    #[serde(rename = "podId")]
    pub pod_id: String,
    #[serde(rename = "nodeId")]
    pub node_id: String,
}

#[derive(Debug, Serialize)]
pub struct PodActionResponse {
    pub message: String,
    #[serde(rename = "podId")]
    pub pod_id: String,
}

#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    #[serde(rename = "nodeID")]
    pub node_id: String,
    pub status: String,
    pub pods: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    pub pods: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetSchedulerRequest {
    pub algorithm: String,
}
