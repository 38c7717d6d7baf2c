use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::inventory::{Inventory, NodeStatus, PodStatus};

/// Periodic loop that marks silent nodes Failed and re-places their pods
/// via the Scheduler. Runs for the lifetime of the process as a single
/// named background task.
pub struct FailureDetector {
    inventory: Arc<Inventory>,
    clock: Arc<dyn Clock>,
    sweep_period: Duration,
    staleness_threshold: chrono::Duration,
}

impl FailureDetector {
    pub fn new(
        inventory: Arc<Inventory>,
        clock: Arc<dyn Clock>,
        sweep_period: Duration,
        staleness_threshold: chrono::Duration,
    ) -> Self {
        Self { inventory, clock, sweep_period, staleness_threshold }
    }

    /// Runs the sweep loop forever, sleeping `sweep_period` between
    /// iterations. Intended to be spawned as its own task at startup.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.sweep_period);
        loop {
            ticker.tick().await;
            self.sweep().await;
        }
    }

    /// A single sweep: iterate a snapshot of node ids (tolerating nodes
    /// created or removed concurrently), fail any node stale beyond the
    /// threshold, and reschedule its pods. The inventory lock is dropped
    /// between extracting a failed node's pod list and consulting the
    /// scheduler, because placement itself needs the lock; iteration
    /// resumes afterward.
    pub async fn sweep(&self) {
        let node_ids = self.inventory.node_ids().await;
        let now = self.clock.now();

        for node_id in node_ids {
            let Some(node) = self.inventory.get_node(&node_id).await else {
                continue; // removed concurrently, tolerate it
            };
            if node.status == NodeStatus::Failed {
                continue;
            }

            let stale = now - node.last_heartbeat;
            if stale <= self.staleness_threshold {
                continue;
            }

            tracing::warn!(node_id = %node_id, stale_secs = stale.num_seconds(), "node marked Failed");

            let drained = match self.inventory.drain_failed_node(&node_id).await {
                Ok(pods) => pods,
                Err(e) => {
                    tracing::error!(node_id = %node_id, error = %e, "failed to drain node during sweep");
                    continue;
                }
            };

            for pod in drained {
                debug_assert_eq!(pod.status, PodStatus::Rescheduling);
                match self.inventory.choose_node(pod.cpu_required).await {
                    Ok(new_node_id) => match self.inventory.reassign_pod(&pod.id, &new_node_id).await {
                        Ok(()) => {
                            tracing::info!(pod_id = %pod.id, node_id = %new_node_id, "pod rescheduled");
                        }
                        Err(e) => {
                            tracing::error!(pod_id = %pod.id, error = %e, "failed to commit reschedule");
                        }
                    },
                    Err(_) => {
                        tracing::error!(
                            pod_id = %pod.id,
                            cpu_required = pod.cpu_required,
                            "no capacity to reschedule pod, leaving orphaned in Rescheduling"
                        );
                    }
                }
            }
        }
    }
}
