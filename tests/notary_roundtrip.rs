//! Runs the SDK against an in-process coordinator over real HTTP.

use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use miner_sdk::signing::verify;
use miner_sdk::{archive, ClaimPayload, MinerSdk, SdkError, SubmissionResponse};
use serde_json::{json, Value};

const MINER_SEED: &str = "0000000000000000000000000000000000000000000000000000000000000000";
const OTHER_SEED: &str = "1111111111111111111111111111111111111111111111111111111111111111";

#[derive(Debug, Clone)]
struct Received {
    payload: ClaimPayload,
    signature: String,
    artifact: Vec<u8>,
    artifact_filename: Option<String>,
    artifact_content_type: Option<String>,
    payload_content_type: Option<String>,
}

struct Coordinator {
    miner_public_key: String,
    received: Mutex<Vec<Received>>,
}

type Shared = Arc<Coordinator>;

fn bad_request(e: impl ToString) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

async fn get_task() -> Json<Value> {
    Json(json!({
        "task_id": "test_task",
        "performance_threshold": "0.9",
        "dataset_hash": "test_dataset_hash",
        "is_active": true
    }))
}

async fn submit_claim(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, String)> {
    let signature = headers
        .get("x-signature")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or((StatusCode::UNAUTHORIZED, "missing signature".to_string()))?;

    let mut payload = None;
    let mut payload_content_type = None;
    let mut artifact = None;
    let mut artifact_filename = None;
    let mut artifact_content_type = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or("").to_string();
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(bad_request)?;
        match name.as_str() {
            "payload" => {
                payload = Some(serde_json::from_slice::<ClaimPayload>(&data).map_err(bad_request)?);
                payload_content_type = content_type;
            }
            "artifact" => {
                artifact = Some(data.to_vec());
                artifact_filename = filename;
                artifact_content_type = content_type;
            }
            _ => (),
        }
    }

    let payload = payload.ok_or_else(|| bad_request("Missing field: payload"))?;
    let artifact = artifact.ok_or_else(|| bad_request("Missing field: artifact"))?;

    if !verify(&state.miner_public_key, &payload, &signature).unwrap_or(false) {
        return Err((StatusCode::UNAUTHORIZED, "bad signature".to_string()));
    }

    state.received.lock().unwrap().push(Received {
        payload,
        signature,
        artifact,
        artifact_filename,
        artifact_content_type,
        payload_content_type,
    });

    Ok(Json(json!({
        "status": "pending_verification",
        "submission_id": "sub-1",
        "estimated_verification_time_seconds": 180
    })))
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn coordinator() -> (String, Shared) {
    let miner = MinerSdk::new(MINER_SEED, "http://unused").unwrap();
    let state = Arc::new(Coordinator {
        miner_public_key: miner.public_key_hex(),
        received: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route("/api/v1/task", get(get_task))
        .route("/api/v1/submit", post(submit_claim))
        .with_state(state.clone());
    (spawn(app).await, state)
}

fn claim() -> ClaimPayload {
    ClaimPayload {
        miner_id: "test_miner".into(),
        task_id: "test_task".into(),
        claimed_score: 0.99,
        artifact_hash: "test_hash".into(),
        timestamp: "2025-01-01T12:00:00Z".into(),
        nonce: "test_nonce".into(),
    }
}

#[tokio::test]
async fn fetches_task_over_http() -> anyhow::Result<()> {
    let (url, _) = coordinator().await;
    let sdk = MinerSdk::new(MINER_SEED, &url)?;

    let task = sdk.fetch_task().await?;
    assert_eq!(task["task_id"], "test_task");
    assert_eq!(task["is_active"], true);
    Ok(())
}

#[tokio::test]
async fn submits_signed_package() -> anyhow::Result<()> {
    let (url, state) = coordinator().await;
    let sdk = MinerSdk::new(MINER_SEED, &url)?;

    let hyperparameters = json!({"param1": "value1", "epochs": 3});
    let artifact = sdk.create_package(&hyperparameters, b"test_wasm_blob")?;
    let mut payload = ClaimPayload::new("test_miner", "test_task", 0.97, archive::digest_hex(&artifact));
    payload.nonce = "fixed".into();

    let resp = sdk.submit_claim(&payload, artifact.clone()).await?;
    let status = SubmissionResponse::from_map(&resp)?;
    assert_eq!(status.status, "pending_verification");
    assert_eq!(status.estimated_verification_time_seconds, Some(180));

    let received = state.received.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    let got = &received[0];
    assert_eq!(got.payload, payload);
    assert_eq!(got.signature, sdk.sign_payload(&payload)?);
    assert_eq!(got.artifact, artifact);
    assert_eq!(got.artifact_filename.as_deref(), Some("submission.tar.gz"));
    assert_eq!(got.artifact_content_type.as_deref(), Some("application/gzip"));
    assert_eq!(got.payload_content_type.as_deref(), Some("application/json"));

    let pkg = archive::read(&got.artifact)?;
    assert_eq!(Value::Object(pkg.hyperparameters), hyperparameters);
    assert_eq!(pkg.module, b"test_wasm_blob");
    assert_eq!(archive::digest_hex(&got.artifact), got.payload.artifact_hash);
    Ok(())
}

#[tokio::test]
async fn submit_package_builds_archive_itself() -> anyhow::Result<()> {
    let (url, state) = coordinator().await;
    let sdk = MinerSdk::new(MINER_SEED, &url)?;

    let resp = sdk.submit_package(&claim(), &json!({"lr": 0.001}), b"").await?;
    assert_eq!(Value::Object(resp)["status"], "pending_verification");

    let received = state.received.lock().unwrap().clone();
    let pkg = archive::read(&received[0].artifact)?;
    assert_eq!(pkg.hyperparameters["lr"], 0.001);
    assert!(pkg.module.is_empty());
    Ok(())
}

#[tokio::test]
async fn rejected_signature_is_remote_error() -> anyhow::Result<()> {
    let (url, state) = coordinator().await;
    let impostor = MinerSdk::new(OTHER_SEED, &url)?;

    let err = impostor.submit_claim(&claim(), b"x".to_vec()).await.unwrap_err();
    match err {
        SdkError::Remote { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "bad signature");
        }
        other => panic!("expected remote error, got {:?}", other),
    }
    assert!(state.received.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_route_is_remote_error() -> anyhow::Result<()> {
    let app = Router::new().route(
        "/api/v1/task",
        get(|| async { (StatusCode::NOT_FOUND, "no active task") }),
    );
    let url = spawn(app).await;
    let sdk = MinerSdk::new(MINER_SEED, &url)?;

    let err = sdk.fetch_task().await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(!err.is_retryable());

    let err = sdk.submit_claim(&claim(), vec![]).await.unwrap_err();
    assert!(matches!(err, SdkError::Remote { .. }));
    Ok(())
}

#[tokio::test]
async fn unreachable_coordinator_is_transport_error() -> anyhow::Result<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);

    let sdk = MinerSdk::new(MINER_SEED, &format!("http://{}", addr))?;
    let err = sdk.fetch_task().await.unwrap_err();
    assert!(matches!(err, SdkError::Transport(_)), "got {:?}", err);
    assert!(err.is_retryable());
    Ok(())
}
