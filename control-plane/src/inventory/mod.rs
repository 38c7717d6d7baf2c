pub mod model;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ControlPlaneError, Result};
use crate::scheduler::Scheduler;

pub use model::{Node, NodeStatus, Pod, PodStatus};

/// Authoritative in-memory store of nodes and pods. Lock discipline is
/// fixed and explicit: whenever both locks are needed, `nodes` is always
/// acquired before `pods`, and released in the reverse order. The
/// scheduler only ever sees an immutable snapshot taken under the read
/// section; committing a placement happens in the same write section
/// that produced the snapshot, so two concurrent admissions can never
/// double-book the same slack.
pub struct Inventory {
    nodes: RwLock<HashMap<String, Node>>,
    /// Insertion order of node ids. `HashMap` iteration order is
    /// unspecified, but first-fit/best-fit/worst-fit tie-breaking keys off
    /// "first seen", so placement always iterates through this rather
    /// than `nodes.values()` directly.
    node_order: RwLock<Vec<String>>,
    pods: RwLock<HashMap<String, Pod>>,
    scheduler: Arc<Scheduler>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Inventory {
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            node_order: RwLock::new(Vec::new()),
            pods: RwLock::new(HashMap::new()),
            scheduler,
        }
    }

    /// Allocates a fresh identifier and inserts a Healthy node.
    pub async fn add_node(&self, total_cpu: u32) -> String {
        let id = new_id();
        self.insert_node(id.clone(), total_cpu).await;
        id
    }

    /// Inserts a Healthy node under a caller-supplied identifier.
    /// Admission uses this so the node's container name (derived from the
    /// identifier before the container is created) matches the id that
    /// ends up in inventory.
    pub async fn insert_node(&self, id: String, total_cpu: u32) {
        let node = Node::new(id.clone(), total_cpu, Utc::now());
        self.nodes.write().await.insert(id.clone(), node);
        self.node_order.write().await.push(id);
    }

    /// Test/demo helper: insert a node with an explicit heartbeat
    /// timestamp, so failure-detector staleness logic can be exercised
    /// without a real 15-second sleep.
    #[doc(hidden)]
    pub async fn add_node_with_heartbeat(&self, total_cpu: u32, last_heartbeat: chrono::DateTime<Utc>) -> String {
        let id = new_id();
        let mut node = Node::new(id.clone(), total_cpu, last_heartbeat);
        node.last_heartbeat = last_heartbeat;
        self.nodes.write().await.insert(id.clone(), node);
        self.node_order.write().await.push(id.clone());
        id
    }

    /// Fails with `HasPods` if the pod set is non-empty.
    pub async fn remove_node(&self, node_id: &str) -> Result<()> {
        let mut nodes = self.nodes.write().await;
        let node = nodes
            .get(node_id)
            .ok_or_else(|| ControlPlaneError::NotFound { kind: "node", id: node_id.to_string() })?;
        if !node.pods.is_empty() {
            return Err(ControlPlaneError::HasPods(node_id.to_string()));
        }
        nodes.remove(node_id);
        self.node_order.write().await.retain(|id| id != node_id);
        Ok(())
    }

    /// Builds an ordered view of `nodes` for scheduler consumption,
    /// walking insertion order rather than `HashMap`'s unspecified order.
    fn ordered<'a>(nodes: &'a HashMap<String, Node>, order: &[String]) -> impl Iterator<Item = &'a Node> {
        order.iter().filter_map(move |id| nodes.get(id))
    }

    pub async fn set_node_status(&self, node_id: &str, status: NodeStatus) -> Result<()> {
        let mut nodes = self.nodes.write().await;
        let node = nodes
            .get_mut(node_id)
            .ok_or_else(|| ControlPlaneError::NotFound { kind: "node", id: node_id.to_string() })?;
        node.status = status;
        Ok(())
    }

    /// Refreshes the heartbeat timestamp and counter on a node. Used both
    /// by the heartbeat receiver and by node restart (which must stamp a
    /// fresh heartbeat so the detector does not immediately fail the
    /// just-restarted node).
    pub async fn stamp_heartbeat(&self, node_id: &str, reported_status: NodeStatus) -> Result<Vec<String>> {
        let mut nodes = self.nodes.write().await;
        let node = nodes
            .get_mut(node_id)
            .ok_or_else(|| ControlPlaneError::NotFound { kind: "node", id: node_id.to_string() })?;
        node.last_heartbeat = Utc::now();
        node.heartbeat_count += 1;
        node.status = reported_status;
        Ok(node.pods.iter().cloned().collect())
    }

    /// Refreshes only the heartbeat timestamp, without touching the
    /// counter or status — used by node restart.
    pub async fn refresh_heartbeat(&self, node_id: &str) -> Result<()> {
        let mut nodes = self.nodes.write().await;
        let node = nodes
            .get_mut(node_id)
            .ok_or_else(|| ControlPlaneError::NotFound { kind: "node", id: node_id.to_string() })?;
        node.last_heartbeat = Utc::now();
        Ok(())
    }

    /// Computes placement and commits the pod assignment as a single
    /// critical section: observing capacity and mutating the node's
    /// residual cannot be split, or two concurrent admissions could
    /// double-book the same slack.
    pub async fn admit_pod(&self, cpu_required: u32) -> Result<(String, String)> {
        let mut nodes = self.nodes.write().await;
        let order = self.node_order.read().await;
        let mut pods = self.pods.write().await;

        let node_id = self.scheduler.choose(cpu_required, Self::ordered(&nodes, &order))?;
        let pod_id = new_id();

        let node = nodes.get_mut(&node_id).expect("scheduler returned unknown node");
        node.residual_cpu -= cpu_required;
        node.pods.insert(pod_id.clone());

        pods.insert(
            pod_id.clone(),
            Pod {
                id: pod_id.clone(),
                cpu_required,
                node_id: node_id.clone(),
                status: PodStatus::Running,
                created_at: Utc::now(),
            },
        );

        self.scheduler.record_placement();

        Ok((pod_id, node_id))
    }

    pub async fn remove_pod(&self, pod_id: &str) -> Result<()> {
        let mut nodes = self.nodes.write().await;
        let mut pods = self.pods.write().await;

        let pod = pods
            .remove(pod_id)
            .ok_or_else(|| ControlPlaneError::NotFound { kind: "pod", id: pod_id.to_string() })?;

        if let Some(node) = nodes.get_mut(&pod.node_id) {
            node.pods.remove(pod_id);
            node.residual_cpu += pod.cpu_required;
        }

        Ok(())
    }

    /// Pure placement decision taken under the read section only — no
    /// mutation, no pod record touched. Callers (the detector) commit the
    /// decision separately via `reassign_pod`, re-acquiring the lock.
    pub async fn choose_node(&self, demand: u32) -> Result<String> {
        let nodes = self.nodes.read().await;
        let order = self.node_order.read().await;
        self.scheduler.choose(demand, Self::ordered(&nodes, &order))
    }

    /// Atomic move of a pod from its previous node (if still present) to
    /// `new_node_id`, subtracting demand from the new node's residual and
    /// updating the pod's node reference and status.
    pub async fn reassign_pod(&self, pod_id: &str, new_node_id: &str) -> Result<()> {
        let mut nodes = self.nodes.write().await;
        let mut pods = self.pods.write().await;

        let pod = pods
            .get_mut(pod_id)
            .ok_or_else(|| ControlPlaneError::NotFound { kind: "pod", id: pod_id.to_string() })?;

        if let Some(old_node) = nodes.get_mut(&pod.node_id) {
            old_node.pods.remove(pod_id);
        }

        let new_node = nodes
            .get_mut(new_node_id)
            .ok_or_else(|| ControlPlaneError::NotFound { kind: "node", id: new_node_id.to_string() })?;
        new_node.pods.insert(pod_id.to_string());
        new_node.residual_cpu -= pod.cpu_required;

        pod.node_id = new_node_id.to_string();
        pod.status = PodStatus::Running;

        drop(nodes);
        drop(pods);
        self.scheduler.record_placement();

        Ok(())
    }

    pub async fn set_pod_status(&self, pod_id: &str, status: PodStatus) -> Result<()> {
        let mut pods = self.pods.write().await;
        let pod = pods
            .get_mut(pod_id)
            .ok_or_else(|| ControlPlaneError::NotFound { kind: "pod", id: pod_id.to_string() })?;
        pod.status = status;
        Ok(())
    }

    /// Extracts a failed node's pod set and clears it, returning the pods
    /// that need rescheduling. Residual is reset to total alongside the
    /// clear: a Failed node is never scheduler-eligible regardless of its
    /// residual, but it can return straight to Healthy on its next
    /// heartbeat, and at that point residual must already reflect its
    /// (now empty) pod set or the capacity freed by the drained pods is
    /// lost for good.
    pub async fn drain_failed_node(&self, node_id: &str) -> Result<Vec<Pod>> {
        let mut nodes = self.nodes.write().await;
        let mut pods = self.pods.write().await;

        let node = nodes
            .get_mut(node_id)
            .ok_or_else(|| ControlPlaneError::NotFound { kind: "node", id: node_id.to_string() })?;
        node.status = NodeStatus::Failed;
        let drained_ids: Vec<String> = node.pods.drain().collect();
        node.residual_cpu = node.total_cpu;

        let mut drained = Vec::with_capacity(drained_ids.len());
        for id in drained_ids {
            if let Some(pod) = pods.get_mut(&id) {
                pod.status = PodStatus::Rescheduling;
                drained.push(pod.clone());
            }
        }
        Ok(drained)
    }

    pub async fn node_ids(&self) -> Vec<String> {
        self.nodes.read().await.keys().cloned().collect()
    }

    pub async fn get_node(&self, node_id: &str) -> Option<Node> {
        self.nodes.read().await.get(node_id).cloned()
    }

    pub async fn get_pod(&self, pod_id: &str) -> Option<Pod> {
        self.pods.read().await.get(pod_id).cloned()
    }

    pub async fn snapshot_nodes(&self) -> HashMap<String, Node> {
        self.nodes.read().await.clone()
    }

    pub async fn snapshot_pods(&self) -> HashMap<String, Pod> {
        self.pods.read().await.clone()
    }
}
