use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum NodeStatus {
    Healthy,
    Starting,
    Stopped,
    Failed,
}

impl std::str::FromStr for NodeStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Healthy" => Ok(NodeStatus::Healthy),
            "Starting" => Ok(NodeStatus::Starting),
            "Stopped" => Ok(NodeStatus::Stopped),
            "Failed" => Ok(NodeStatus::Failed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PodStatus {
    Running,
    Rescheduling,
    Restarting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub total_cpu: u32,
    pub residual_cpu: u32,
    pub pods: HashSet<String>,
    pub status: NodeStatus,
    pub last_heartbeat: DateTime<Utc>,
    pub heartbeat_count: u64,
}

impl Node {
    pub fn new(id: String, total_cpu: u32, now: DateTime<Utc>) -> Self {
        Self {
            id,
            total_cpu,
            residual_cpu: total_cpu,
            pods: HashSet::new(),
            status: NodeStatus::Healthy,
            last_heartbeat: now,
            heartbeat_count: 0,
        }
    }

    pub fn container_name(&self) -> String {
        format!("node-{}", self.id)
    }

    pub fn is_eligible(&self, demand: u32) -> bool {
        self.status == NodeStatus::Healthy && self.residual_cpu >= demand
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pod {
    pub id: String,
    pub cpu_required: u32,
    pub node_id: String,
    pub status: PodStatus,
    pub created_at: DateTime<Utc>,
}
