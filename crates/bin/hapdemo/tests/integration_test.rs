//! End-to-end smoke tests for the full hapdemo stack.
//!
//! Each test wires the complete application (directory store in a temporary
//! directory, the virtual switch, the real registry, services and axum router)
//! and exercises the HTTP layer via `tower::ServiceExt::oneshot`; no TCP port
//! is bound.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use hapdemo_adapter_http_axum::HapServer;
use hapdemo_adapter_store_fs::FsStore;
use hapdemo_adapter_virtual::{SwitchListener, VirtualSwitch};
use hapdemo_app::event_bus::InProcessEventBus;
use hapdemo_app::lifecycle::Shutdown;
use hapdemo_app::registry::AccessoryRegistry;
use hapdemo_domain::accessory::AccessoryInfo;
use hapdemo_domain::id::ControllerId;
use hapdemo_domain::pairing::Pin;

struct Stack {
    app: axum::Router,
    event_bus: Arc<InProcessEventBus>,
    shutdown: Shutdown,
    _dir: tempfile::TempDir,
}

async fn stack_in(dir: tempfile::TempDir) -> Stack {
    let accessory = VirtualSwitch::new(AccessoryInfo {
        name: "MBP-DEMO".into(),
        ..AccessoryInfo::default()
    })
    .accessory()
    .unwrap();
    let event_bus = Arc::new(InProcessEventBus::new(16));
    let registry = Arc::new(AccessoryRegistry::new(Arc::clone(&event_bus)));
    registry.add(accessory).unwrap();

    let store = FsStore::open(dir.path().join("db")).await.unwrap();
    let server = HapServer::new(
        store,
        registry,
        Arc::clone(&event_bus),
        Pin::parse("00102003").unwrap(),
    )
    .await
    .unwrap();
    let shutdown = Shutdown::new();
    Stack {
        app: server.router(shutdown.token()),
        event_bus,
        shutdown,
        _dir: dir,
    }
}

async fn stack() -> Stack {
    stack_in(tempfile::tempdir().unwrap()).await
}

fn request(method: &str, uri: &str, controller: Option<ControllerId>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(controller) = controller {
        builder = builder.header("X-Hap-Controller", controller.to_string());
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn pair(app: &axum::Router) -> ControllerId {
    let controller = ControllerId::new();
    let (status, body) = send(
        app,
        request(
            "POST",
            "/pair-setup",
            None,
            Some(json!({"identifier": controller.to_string(), "pin": "001-02-003"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["admin"], true);
    controller
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let stack = stack().await;

    let response = stack
        .app
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Accessory database
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_expose_switch_accessory() {
    let stack = stack().await;
    let controller = pair(&stack.app).await;

    let (status, body) = send(&stack.app, request("GET", "/accessories", Some(controller), None)).await;

    assert_eq!(status, StatusCode::OK);
    let services = body["accessories"][0]["services"].as_array().unwrap();
    let types: Vec<&str> = services.iter().map(|s| s["type"].as_str().unwrap()).collect();
    assert_eq!(types, vec!["3E", "A2", "49"]);
    let on = &services[2]["characteristics"][0];
    assert_eq!(on["type"], "25");
    assert_eq!(on["value"], false);
    assert_eq!(on["perms"], json!(["pr", "pw", "ev"]));
}

// ---------------------------------------------------------------------------
// Switch control
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_toggle_switch_and_notify_listener() {
    let stack = stack().await;
    let controller = pair(&stack.app).await;
    let mut events = stack.event_bus.subscribe("test");

    let (status, _) = send(
        &stack.app,
        request(
            "PUT",
            "/characteristics",
            Some(controller),
            Some(json!({"characteristics": [{"aid": 1, "iid": 11, "value": true}]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let event = events.next().await.unwrap();
    let accessory = VirtualSwitch::new(AccessoryInfo {
        name: "MBP-DEMO".into(),
        ..AccessoryInfo::default()
    })
    .accessory()
    .unwrap();
    let listener = SwitchListener::for_accessory(&accessory).unwrap();
    assert_eq!(
        listener.action(&event),
        Some(hapdemo_adapter_virtual::SwitchAction::TurnedOn)
    );

    let (status, body) = send(
        &stack.app,
        request("GET", "/characteristics?id=1.11", Some(controller), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["characteristics"][0]["value"], true);
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_remember_pairings_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_path_buf();
    let first = stack_in(dir).await;
    let controller = pair(&first.app).await;
    let Stack { _dir: dir, .. } = first;
    assert!(path.join("db").join(format!("pairing.{controller}")).is_file());

    let second = stack_in(dir).await;
    let (status, _) = send(&second.app, request("GET", "/accessories", Some(controller), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &second.app,
        request(
            "POST",
            "/pair-setup",
            None,
            Some(json!({"identifier": ControllerId::new().to_string(), "pin": "00102003"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unavailable");
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_close_event_streams_on_shutdown() {
    let stack = stack().await;
    let controller = pair(&stack.app).await;

    let response = stack
        .app
        .clone()
        .oneshot(request("GET", "/events", Some(controller), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(stack.shutdown.trigger());
    assert!(!stack.shutdown.trigger());
    tokio::time::timeout(Duration::from_secs(2), response.into_body().collect())
        .await
        .expect("event stream should end on shutdown")
        .unwrap();
}
