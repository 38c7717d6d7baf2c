use std::sync::Arc;

use tokio::time::{sleep, Duration};

use crate::error::{ControlPlaneError, Result};
use crate::inventory::{Inventory, NodeStatus, PodStatus};
use crate::runtime::ContainerRuntime;

/// Wraps container-runtime calls and Inventory mutations together. Every
/// runtime invocation happens strictly outside the inventory lock —
/// these methods never hold a lock guard across an `.await` on the
/// runtime.
pub struct Admission {
    inventory: Arc<Inventory>,
    runtime: Arc<dyn ContainerRuntime>,
    api_server_addr: String,
}

impl Admission {
    pub fn new(inventory: Arc<Inventory>, runtime: Arc<dyn ContainerRuntime>, api_server_addr: String) -> Self {
        Self { inventory, runtime, api_server_addr }
    }

    pub async fn create_node(&self, cpu_cores: u32) -> Result<String> {
        if cpu_cores == 0 {
            return Err(ControlPlaneError::Validation("cpuCores must be positive".to_string()));
        }

        let node_id = uuid::Uuid::new_v4().to_string();
        let container_name = format!("node-{node_id}");
        let env = vec![
            ("NODE_ID".to_string(), node_id.clone()),
            ("API_SERVER".to_string(), self.api_server_addr.clone()),
        ];

        // On runtime failure, do not insert into inventory at all.
        self.runtime.create(&container_name, &env).await?;

        self.inventory.insert_node(node_id.clone(), cpu_cores).await;
        Ok(node_id)
    }

    pub async fn stop_node(&self, node_id: &str) -> Result<()> {
        let node = self
            .inventory
            .get_node(node_id)
            .await
            .ok_or_else(|| ControlPlaneError::NotFound { kind: "node", id: node_id.to_string() })?;

        self.runtime.stop(&node.container_name()).await?;
        self.inventory.set_node_status(node_id, NodeStatus::Stopped).await
    }

    /// Refreshes last-heartbeat on restart so the detector does not
    /// immediately fail the just-restarted node.
    pub async fn restart_node(&self, node_id: &str) -> Result<()> {
        let node = self
            .inventory
            .get_node(node_id)
            .await
            .ok_or_else(|| ControlPlaneError::NotFound { kind: "node", id: node_id.to_string() })?;

        let name = node.container_name();
        self.runtime
            .inspect_running(&name)
            .await
            .map_err(|_| ControlPlaneError::Runtime(format!("container {name} does not exist")))?;

        self.runtime.stop(&name).await.or_else(|e| match e {
            ControlPlaneError::AlreadyStopped(_) => Ok(()),
            other => Err(other),
        })?;
        self.runtime.start(&name).await?;

        self.inventory.set_node_status(node_id, NodeStatus::Starting).await?;
        self.inventory.refresh_heartbeat(node_id).await
    }

    /// Rejects if the pod set is non-empty; stops best-effort, then
    /// forcefully removes. If removal fails inventory is left unchanged.
    pub async fn delete_node(&self, node_id: &str) -> Result<()> {
        let node = self
            .inventory
            .get_node(node_id)
            .await
            .ok_or_else(|| ControlPlaneError::NotFound { kind: "node", id: node_id.to_string() })?;

        if !node.pods.is_empty() {
            return Err(ControlPlaneError::HasPods(node_id.to_string()));
        }

        let name = node.container_name();
        let _ = self.runtime.stop(&name).await; // best effort, ignore errors
        self.runtime.remove(&name).await?;

        self.inventory.remove_node(node_id).await
    }

    pub async fn launch_pod(&self, cpu_required: u32) -> Result<(String, String)> {
        if cpu_required == 0 {
            return Err(ControlPlaneError::Validation("cpuRequired must be positive".to_string()));
        }
        self.inventory.admit_pod(cpu_required).await
    }

    pub async fn delete_pod(&self, pod_id: &str) -> Result<()> {
        self.inventory.remove_pod(pod_id).await
    }

    /// Sets status to Restarting, then schedules a deferred transition
    /// back to Running after a fixed 2s cosmetic delay. No runtime call
    /// is made — pod restart is purely an inventory-visible status blip.
    pub async fn restart_pod(&self, pod_id: &str) -> Result<()> {
        let pod = self
            .inventory
            .get_pod(pod_id)
            .await
            .ok_or_else(|| ControlPlaneError::NotFound { kind: "pod", id: pod_id.to_string() })?;
        self.inventory
            .get_node(&pod.node_id)
            .await
            .ok_or_else(|| ControlPlaneError::NotFound { kind: "node", id: pod.node_id.clone() })?;

        self.inventory.set_pod_status(pod_id, PodStatus::Restarting).await?;

        let inventory = self.inventory.clone();
        let pod_id = pod_id.to_string();
        tokio::spawn(async move {
            sleep(Duration::from_secs(2)).await;
            if let Err(e) = inventory.set_pod_status(&pod_id, PodStatus::Running).await {
                tracing::debug!(pod_id = %pod_id, error = %e, "pod vanished before restart completed");
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RecordingRuntime;
    use crate::scheduler::{Algorithm, Scheduler};

    fn admission() -> (Admission, Arc<Inventory>) {
        let inventory = Arc::new(Inventory::new(Arc::new(Scheduler::new(Algorithm::FirstFit))));
        let runtime = Arc::new(RecordingRuntime::new());
        let admission = Admission::new(inventory.clone(), runtime, "http://localhost:8080".to_string());
        (admission, inventory)
    }

    #[tokio::test]
    async fn create_node_rejects_non_positive_cpu() {
        let (admission, _) = admission();
        assert!(matches!(
            admission.create_node(0).await,
            Err(ControlPlaneError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn delete_node_blocked_while_pods_present() {
        let (admission, inventory) = admission();
        let node_id = admission.create_node(4).await.unwrap();
        let (pod_id, _) = admission.launch_pod(1).await.unwrap();

        assert!(matches!(
            admission.delete_node(&node_id).await,
            Err(ControlPlaneError::HasPods(_))
        ));

        admission.delete_pod(&pod_id).await.unwrap();
        assert!(admission.delete_node(&node_id).await.is_ok());
        assert!(inventory.get_node(&node_id).await.is_none());
    }

    #[tokio::test]
    async fn stop_then_restart_refreshes_heartbeat() {
        let (admission, inventory) = admission();
        let node_id = admission.create_node(4).await.unwrap();

        admission.stop_node(&node_id).await.unwrap();
        assert_eq!(inventory.get_node(&node_id).await.unwrap().status, NodeStatus::Stopped);

        admission.restart_node(&node_id).await.unwrap();
        assert_eq!(inventory.get_node(&node_id).await.unwrap().status, NodeStatus::Starting);
    }

    #[tokio::test]
    async fn restart_pod_returns_to_running_after_delay() {
        let (admission, inventory) = admission();
        admission.create_node(4).await.unwrap();
        let (pod_id, _) = admission.launch_pod(1).await.unwrap();

        admission.restart_pod(&pod_id).await.unwrap();
        assert_eq!(inventory.get_pod(&pod_id).await.unwrap().status, PodStatus::Restarting);

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(inventory.get_pod(&pod_id).await.unwrap().status, PodStatus::Running);
    }
}
