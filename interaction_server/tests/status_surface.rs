mod support;

use interaction_server::domain::Tuning;
use interaction_server::domain::ports::AllowAll;
use interaction_server::interface_adapters::clients::BridgeClient;
use interaction_server::interface_adapters::protocol::StatusResponse;
use interaction_server::interface_adapters::state::SystemClock;
use interaction_server::use_cases::SessionContext;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use support::{BridgeState, FakeBridge, eventually, spawn_fake_bridge};

// Start the service against the fake bridge and return its base URL.
async fn start_service(bridge: &FakeBridge) -> String {
    let client = Arc::new(
        BridgeClient::new(bridge.base_url.clone(), Some(Duration::from_secs(2)))
            .expect("client should build"),
    );
    let ctx = Arc::new(SessionContext::new(
        client.clone(),
        client,
        Arc::new(SystemClock),
        Arc::new(AllowAll),
        Tuning::default(),
    ));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        interaction_server::run(listener, ctx).await.expect("server failed");
    });
    format!("http://{addr}")
}

async fn fetch_status(base_url: &str) -> Option<StatusResponse> {
    let response = reqwest::get(format!("{base_url}/status")).await.ok()?;
    response.json::<StatusResponse>().await.ok()
}

#[tokio::test]
async fn when_bridge_answers_then_status_turns_connected() {
    let bridge = spawn_fake_bridge(BridgeState::default()).await;
    let base_url = start_service(&bridge).await;

    let mut last = None;
    for _ in 0..100 {
        last = fetch_status(&base_url).await;
        if last.as_ref().is_some_and(|s| s.session == "connected") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let status = last.expect("status should be served");
    assert_eq!(status.session, "connected");
    assert_eq!(status.live_projectiles, 0);
    assert!(!status.tavern_closed);

    let health = reqwest::get(format!("{base_url}/health"))
        .await
        .expect("health should respond")
        .text()
        .await
        .expect("health body");
    assert_eq!(health, "ok");
}

#[tokio::test]
async fn when_stone_touches_the_anchor_then_bridge_receives_the_teleport() {
    let anchor = Tuning::default().stone_teleport.anchor;
    let bridge = spawn_fake_bridge(BridgeState {
        actors: vec![json!({
            "id": 1,
            "name": "Walker",
            "head": [anchor.x, anchor.y + 0.5, anchor.z - 0.5],
            "left_hand": [anchor.x - 0.4, anchor.y, anchor.z - 0.5],
            "right_hand": [anchor.x + 0.1, anchor.y, anchor.z]
        })],
        inventories: [(1, json!({ "right": { "id": 9, "name": "Stone" } }))].into(),
        ..Default::default()
    })
    .await;
    let _base_url = start_service(&bridge).await;

    let delivered = eventually(|| {
        let types = bridge.effect_types();
        types.iter().any(|t| t == "destroy_item") && types.iter().any(|t| t == "teleport")
    })
    .await;

    assert!(delivered, "effects seen: {:?}", bridge.effect_types());
}
