use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct HeartbeatRequest {
    #[serde(rename = "nodeID")]
    node_id: String,
    status: String,
    pods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct HeartbeatResponse {
    pods: Vec<String>,
}

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let node_id = std::env::var("NODE_ID")
        .map_err(|_| anyhow::anyhow!("NODE_ID and API_SERVER environment variables must be set"))?;
    let api_server = std::env::var("API_SERVER")
        .map_err(|_| anyhow::anyhow!("NODE_ID and API_SERVER environment variables must be set"))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let mut pods: Vec<String> = Vec::new();
    let heartbeat_url = format!("{}/heartbeat", api_server.trim_end_matches('/'));

    loop {
        tokio::time::sleep(HEARTBEAT_INTERVAL).await;

        let body = HeartbeatRequest {
            node_id: node_id.clone(),
            status: "Healthy".to_string(),
            pods: pods.clone(),
        };

        match client.post(&heartbeat_url).json(&body).send().await {
            Ok(resp) => match resp.json::<HeartbeatResponse>().await {
                Ok(res) => {
                    pods = res.pods;
                    tracing::info!(%node_id, ?pods, "pods updated");
                }
                Err(err) => tracing::warn!(%err, "failed to decode heartbeat response"),
            },
            Err(err) => tracing::warn!(%err, "failed to send heartbeat"),
        }
    }
}
