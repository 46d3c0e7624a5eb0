mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use common::{test_state, tx, MockLedger};
use reefwatch::api::router::create_router;
use reefwatch::ledger::OfflineLedger;
use reefwatch::models::{BlockDataset, BlocksUpdate};

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn seeded_ledger() -> Arc<MockLedger> {
    let ledger = MockLedger::new();
    ledger.add_block(42, vec![("tx42", tx(&["A"], &[("B", 500), ("C", 500)]))]);
    ledger.set_balance("A", 12_000);
    ledger.set_balance("B", 150);
    ledger.set_balance("C", 0);
    ledger.set_tip(Some(42));
    ledger
}

#[tokio::test]
async fn test_health_check() {
    let app = create_router(test_state(seeded_ledger()));
    let (status, json) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["ledger"], "configured");
    assert_eq!(json["viewers"], 0);
    assert!(json["latest_height"].is_null());
}

#[tokio::test]
async fn test_block_query_returns_creatures() {
    let app = create_router(test_state(seeded_ledger()));
    let (status, json) = get_json(app, "/block/42").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["height"], 42);

    let creatures = json["creatures"].as_array().unwrap();
    assert_eq!(creatures.len(), 3);

    let a = &creatures[0];
    assert_eq!(a["address"], "A");
    assert_eq!(a["ada"], 12000.0);
    assert_eq!(a["type"], "tuna");
    assert_eq!(a["role"], "sender");
    assert_eq!(a["transaction_id"], "tx42");
    assert_eq!(a["amount_transferred"], 1000.0);
    assert!(a["y"].as_u64().is_some_and(|y| (10..=90).contains(&y)));
    assert_eq!(a["sent_to_info"][0]["address"], "B");
    assert_eq!(a["sent_to_info"][0]["type"], "crab");
    assert_eq!(a["sent_to_info"][1]["type"], "shrimp");
    assert!(a["received_from_info"].as_array().unwrap().is_empty());

    // Round-trips into the typed model
    let dataset: BlockDataset = serde_json::from_value(json).unwrap();
    assert_eq!(dataset.creatures[1].role, "receiver");
}

#[tokio::test]
async fn test_block_query_unknown_height() {
    let app = create_router(test_state(seeded_ledger()));
    let (status, json) = get_json(app, "/block/7").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "error": "Block 7 not found" }));
}

#[tokio::test]
async fn test_block_query_without_credentials() {
    let app = create_router(test_state(Arc::new(OfflineLedger::default())));
    let (_, json) = get_json(app, "/block/42").await;

    assert_eq!(
        json["error"],
        "API not configured - please set BLOCKFROST_API_KEY"
    );
}

#[tokio::test]
async fn test_latest_reports_upstream_tip() {
    let app = create_router(test_state(seeded_ledger()));
    let (_, json) = get_json(app, "/latest").await;
    assert_eq!(json, serde_json::json!({ "height": 42 }));
}

#[tokio::test]
async fn test_latest_offline_uses_fallback_height() {
    let app = create_router(test_state(Arc::new(OfflineLedger::new(3_744_495))));
    let (_, json) = get_json(app, "/latest").await;
    assert_eq!(json, serde_json::json!({ "height": 3_744_495 }));
}

#[tokio::test]
async fn test_latest_falls_back_to_cache_then_empty() {
    let ledger = seeded_ledger();
    ledger.set_tip(None);
    let state = test_state(ledger);

    let (_, json) = get_json(create_router(state.clone()), "/latest").await;
    assert_eq!(json, serde_json::json!({}));

    state
        .latest
        .set(BlockDataset {
            height: 41,
            creatures: vec![],
        })
        .await;
    let (_, json) = get_json(create_router(state), "/latest").await;
    assert_eq!(json, serde_json::json!({ "height": 41, "creatures": [] }));
}

#[tokio::test]
async fn test_missing_image_reports_error() {
    let app = create_router(test_state(seeded_ledger()));
    let (status, json) = get_json(app, "/img/nope.png").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["error"], "Image nope.png not found");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = create_router(test_state(seeded_ledger()));

    let resp = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("poll_ticks_total"));
}

#[tokio::test]
async fn test_websocket_viewer_receives_broadcast() {
    let state = test_state(seeded_ledger());
    let hub = state.hub.clone();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();

    // Registration happens after the upgrade completes
    for _ in 0..100 {
        if hub.viewer_count() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(hub.viewer_count(), 1);

    let update = BlocksUpdate {
        blocks: vec![BlockDataset {
            height: 42,
            creatures: vec![],
        }],
    };
    let report = hub.broadcast(&update).unwrap();
    assert_eq!(report.delivered, 1);

    let msg = tokio::time::timeout(Duration::from_secs(2), socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let received: BlocksUpdate = serde_json::from_str(msg.to_text().unwrap()).unwrap();
    assert_eq!(received, update);

    // Closing the socket unregisters the viewer
    socket.close(None).await.unwrap();
    for _ in 0..100 {
        if hub.viewer_count() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(hub.viewer_count(), 0);
}
