use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::api::models::SetSchedulerRequest;
use crate::api::server::AppState;
use crate::error::Result;
use crate::scheduler::Algorithm;

pub async fn set_scheduler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetSchedulerRequest>,
) -> Result<()> {
    let algorithm: Algorithm = req.algorithm.parse()?;
    state.scheduler.set_algorithm(algorithm);
    Ok(())
}
