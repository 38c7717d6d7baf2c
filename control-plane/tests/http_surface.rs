use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use control_plane::admission::Admission;
use control_plane::api::server::{build_router, AppState};
use control_plane::inventory::Inventory;
use control_plane::runtime::RecordingRuntime;
use control_plane::scheduler::{Algorithm, Scheduler};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(algorithm: Algorithm) -> axum::Router {
    let scheduler = Arc::new(Scheduler::new(algorithm));
    let inventory = Arc::new(Inventory::new(scheduler.clone()));
    let runtime = Arc::new(RecordingRuntime::new());
    let admission = Admission::new(inventory.clone(), runtime, "http://localhost:8080".to_string());
    let state = Arc::new(AppState { inventory, scheduler, admission });
    build_router(state)
}

async fn send(router: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
            None => Body::empty(),
        })
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn health_returns_ok() {
    let router = app(Algorithm::FirstFit);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn scenario_1_first_fit_placement() {
    let router = app(Algorithm::FirstFit);

    let (status, a) = send(&router, "POST", "/nodes", Some(json!({"cpuCores": 4}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let a_id = a["nodeId"].as_str().unwrap().to_string();

    let (status, _b) = send(&router, "POST", "/nodes", Some(json!({"cpuCores": 4}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, pod) = send(&router, "POST", "/pods", Some(json!({"cpuRequired": 3}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(pod["nodeId"].as_str().unwrap(), a_id);

    let (_, nodes) = send(&router, "GET", "/nodes", None).await;
    assert_eq!(nodes[&a_id]["residual_cpu"], 1);
}

#[tokio::test]
async fn scenario_2_best_fit_placement() {
    let router = app(Algorithm::BestFit);

    let (_, a) = send(&router, "POST", "/nodes", Some(json!({"cpuCores": 8}))).await;
    let (_, b) = send(&router, "POST", "/nodes", Some(json!({"cpuCores": 4}))).await;
    let (_, _c) = send(&router, "POST", "/nodes", Some(json!({"cpuCores": 6}))).await;
    let a_id = a["nodeId"].as_str().unwrap().to_string();
    let b_id = b["nodeId"].as_str().unwrap().to_string();

    let (status, pod) = send(&router, "POST", "/pods", Some(json!({"cpuRequired": 3}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(pod["nodeId"].as_str().unwrap(), b_id);

    let (_, nodes) = send(&router, "GET", "/nodes", None).await;
    assert_eq!(nodes[&b_id]["residual_cpu"], 1);
    assert_eq!(nodes[&a_id]["residual_cpu"], 8);
}

#[tokio::test]
async fn scenario_3_capacity_exact_then_exhausted() {
    let router = app(Algorithm::FirstFit);

    let (_, a) = send(&router, "POST", "/nodes", Some(json!({"cpuCores": 2}))).await;
    let a_id = a["nodeId"].as_str().unwrap().to_string();

    let (status, _) = send(&router, "POST", "/pods", Some(json!({"cpuRequired": 2}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, nodes) = send(&router, "GET", "/nodes", None).await;
    assert_eq!(nodes[&a_id]["residual_cpu"], 0);

    let (status, _) = send(&router, "POST", "/pods", Some(json!({"cpuRequired": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scenario_5_delete_node_guard() {
    let router = app(Algorithm::FirstFit);

    let (_, a) = send(&router, "POST", "/nodes", Some(json!({"cpuCores": 4}))).await;
    let a_id = a["nodeId"].as_str().unwrap().to_string();

    let (_, pod) = send(&router, "POST", "/pods", Some(json!({"cpuRequired": 1}))).await;
    let pod_id = pod["podId"].as_str().unwrap().to_string();

    let (status, _) = send(&router, "DELETE", &format!("/nodes/{a_id}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, "DELETE", &format!("/pods/{pod_id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, "DELETE", &format!("/nodes/{a_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn scenario_6_round_robin_dispersion() {
    let router = app(Algorithm::RoundRobin);

    let mut node_ids = Vec::new();
    for _ in 0..3 {
        let (_, n) = send(&router, "POST", "/nodes", Some(json!({"cpuCores": 4}))).await;
        node_ids.push(n["nodeId"].as_str().unwrap().to_string());
    }

    for _ in 0..6 {
        let (status, _) = send(&router, "POST", "/pods", Some(json!({"cpuRequired": 1}))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, nodes) = send(&router, "GET", "/nodes", None).await;
    for id in node_ids {
        assert_eq!(nodes[&id]["pods"].as_array().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn heartbeat_unknown_node_is_404() {
    let router = app(Algorithm::FirstFit);
    let (status, _) = send(
        &router,
        "POST",
        "/heartbeat",
        Some(json!({"nodeID": "does-not-exist", "status": "Healthy", "pods": []})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn set_scheduler_rejects_unknown_algorithm() {
    let router = app(Algorithm::FirstFit);
    let (status, _) = send(&router, "POST", "/scheduler", Some(json!({"algorithm": "bogus"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, "POST", "/scheduler", Some(json!({"algorithm": "worst-fit"}))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn create_node_rejects_non_positive_cpu() {
    let router = app(Algorithm::FirstFit);
    let (status, _) = send(&router, "POST", "/nodes", Some(json!({"cpuCores": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
