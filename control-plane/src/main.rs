use std::sync::Arc;

use control_plane::admission::Admission;
use control_plane::api::server::{build_router, AppState};
use control_plane::clock::SystemClock;
use control_plane::config::Config;
use control_plane::detector::FailureDetector;
use control_plane::inventory::Inventory;
use control_plane::runtime::ProcessRuntime;
use control_plane::scheduler::Scheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();

    let scheduler = Arc::new(Scheduler::new(config.initial_algorithm));
    let inventory = Arc::new(Inventory::new(scheduler.clone()));
    let runtime = Arc::new(ProcessRuntime::new(config.runtime_binary.clone(), config.node_image.clone()));
    let api_server_addr = format!("http://host.docker.internal:{}", config.port);
    let admission = Admission::new(inventory.clone(), runtime, api_server_addr);

    let state = Arc::new(AppState { inventory: inventory.clone(), scheduler, admission });

    let detector = FailureDetector::new(
        inventory,
        Arc::new(SystemClock),
        config.sweep_period,
        config.staleness_threshold,
    );
    tokio::spawn(detector.run());

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(%addr, "control plane listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
