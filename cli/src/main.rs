use std::collections::HashMap;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "infractl")]
#[command(about = "Operator client for the control plane HTTP surface", long_about = None)]
struct Cli {
    /// Base URL of the control plane API server
    #[arg(long, default_value = "http://localhost:8080")]
    api_server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new node with the given CPU core count
    AddNode { cpu_cores: i64 },
    /// Stop a node
    StopNode { node_id: String },
    /// Restart a node
    RestartNode { node_id: String },
    /// Delete a stopped node
    DeleteNode { node_id: String },
    /// Launch a pod with the given CPU requirement
    LaunchPod { cpu_required: i64 },
    /// Delete a pod
    DeletePod { pod_id: String },
    /// Restart a pod
    RestartPod { pod_id: String },
    /// List all nodes with their health status
    ListNodes,
    /// List all pods with their details
    ListPods,
    /// Change the scheduling algorithm
    SetScheduler { algorithm: String },
}

#[derive(Debug, Serialize)]
struct CreateNodeRequest {
    #[serde(rename = "cpuCores")]
    cpu_cores: i64,
}

#[derive(Debug, Serialize)]
struct LaunchPodRequest {
    #[serde(rename = "cpuRequired")]
    cpu_required: i64,
}

#[derive(Debug, Serialize)]
struct SetSchedulerRequest {
    algorithm: String,
}

#[derive(Debug, Deserialize)]
struct NodeView {
    id: String,
    total_cpu: i64,
    residual_cpu: i64,
    pods: Vec<String>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct PodView {
    id: String,
    cpu_required: i64,
    node_id: String,
    status: String,
    created_at: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let base = cli.api_server.trim_end_matches('/').to_string();

    match cli.command {
        Commands::AddNode { cpu_cores } => {
            if cpu_cores <= 0 {
                anyhow::bail!("cpuCores must be a positive integer");
            }
            let resp = client
                .post(format!("{base}/nodes"))
                .json(&CreateNodeRequest { cpu_cores })
                .send()
                .await?;
            if resp.status() != reqwest::StatusCode::CREATED {
                anyhow::bail!("failed to add node, status: {}", resp.status());
            }
            println!("Node added successfully");
        }
        Commands::StopNode { node_id } => {
            let resp = client.post(format!("{base}/nodes/{node_id}/stop")).send().await?;
            if resp.status() != reqwest::StatusCode::OK {
                anyhow::bail!("failed to stop node: {}", resp.text().await?);
            }
            println!("Node stopped successfully");
        }
        Commands::RestartNode { node_id } => {
            let resp = client.post(format!("{base}/nodes/{node_id}/restart")).send().await?;
            if resp.status() != reqwest::StatusCode::OK {
                anyhow::bail!("failed to restart node: {}", resp.text().await?);
            }
            println!("Node restarted successfully");
        }
        Commands::DeleteNode { node_id } => {
            let resp = client.delete(format!("{base}/nodes/{node_id}")).send().await?;
            if resp.status() != reqwest::StatusCode::OK {
                anyhow::bail!("failed to delete node: {}", resp.text().await?);
            }
            println!("Node deleted successfully");
        }
        Commands::LaunchPod { cpu_required } => {
            if cpu_required <= 0 {
                anyhow::bail!("cpuRequired must be a positive integer");
            }
            let resp = client
                .post(format!("{base}/pods"))
                .json(&LaunchPodRequest { cpu_required })
                .send()
                .await?;
            if resp.status() != reqwest::StatusCode::CREATED {
                anyhow::bail!("failed to launch pod, status: {}", resp.status());
            }
            println!("Pod launched successfully");
        }
        Commands::DeletePod { pod_id } => {
            let resp = client.delete(format!("{base}/pods/{pod_id}")).send().await?;
            if resp.status() != reqwest::StatusCode::OK {
                anyhow::bail!("failed to delete pod: {}", resp.text().await?);
            }
            println!("Pod deleted successfully");
        }
        Commands::RestartPod { pod_id } => {
            let resp = client.post(format!("{base}/pods/{pod_id}/restart")).send().await?;
            if resp.status() != reqwest::StatusCode::OK {
                anyhow::bail!("failed to restart pod: {}", resp.text().await?);
            }
            println!("Pod restarted successfully");
        }
        Commands::ListNodes => {
            let resp = client.get(format!("{base}/nodes")).send().await?;
            let nodes: HashMap<String, NodeView> = resp.json().await?;
            for node in nodes.values() {
                println!(
                    "Node {}: CPU {}/{}, Status: {}, Pods: {:?}",
                    node.id, node.residual_cpu, node.total_cpu, node.status, node.pods
                );
            }
        }
        Commands::ListPods => {
            let resp = client.get(format!("{base}/pods")).send().await?;
            let pods: HashMap<String, PodView> = resp.json().await?;
            if pods.is_empty() {
                println!("No pods found");
                return Ok(());
            }
            println!("Pods:");
            for pod in pods.values() {
                println!(
                    "Pod {}: CPU {}, Node {}, Status: {}, Created: {}",
                    &pod.id[..8.min(pod.id.len())],
                    pod.cpu_required,
                    &pod.node_id[..8.min(pod.node_id.len())],
                    pod.status,
                    pod.created_at
                );
            }
        }
        Commands::SetScheduler { algorithm } => {
            let resp = client
                .post(format!("{base}/scheduler"))
                .json(&SetSchedulerRequest { algorithm: algorithm.clone() })
                .send()
                .await?;
            if resp.status() != reqwest::StatusCode::OK {
                anyhow::bail!("failed to set scheduler, status: {}", resp.status());
            }
            println!("Scheduler algorithm set to {algorithm}");
        }
    }

    Ok(())
}
