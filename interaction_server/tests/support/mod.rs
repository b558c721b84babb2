// Fake session bridge for integration tests, served by axum on an ephemeral port.
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

#[derive(Default)]
pub struct BridgeState {
    pub actors: Vec<Value>,
    pub inventories: HashMap<u64, Value>,
    pub changes: Vec<Value>,
    // Every effect body received, in arrival order.
    pub effects: Vec<Value>,
    pub balance: i64,
    // `{ "name", "value" }` objects returned for stats queries.
    pub stats: Vec<Value>,
    pub fail_effects: bool,
}

#[derive(Clone)]
pub struct FakeBridge {
    pub base_url: String,
    pub state: Arc<Mutex<BridgeState>>,
}

impl FakeBridge {
    pub fn with_state<R>(&self, f: impl FnOnce(&mut BridgeState) -> R) -> R {
        let mut guard = self.state.lock().expect("bridge state mutex poisoned");
        f(&mut guard)
    }

    pub fn effect_types(&self) -> Vec<String> {
        self.with_state(|s| {
            s.effects
                .iter()
                .filter_map(|e| e["type"].as_str().map(str::to_string))
                .collect()
        })
    }
}

type Shared = Arc<Mutex<BridgeState>>;

async fn actors(State(state): State<Shared>) -> Json<Vec<Value>> {
    let guard = state.lock().expect("bridge state mutex poisoned");
    Json(guard.actors.clone())
}

async fn inventory(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    let guard = state.lock().expect("bridge state mutex poisoned");
    match guard.inventories.get(&id) {
        Some(inv) => Json(inv.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "unknown actor" })),
        )
            .into_response(),
    }
}

async fn inventory_changes(State(state): State<Shared>) -> Json<Vec<Value>> {
    let mut guard = state.lock().expect("bridge state mutex poisoned");
    Json(std::mem::take(&mut guard.changes))
}

async fn effects(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut guard = state.lock().expect("bridge state mutex poisoned");
    if guard.fail_effects {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "bridge overloaded" })),
        )
            .into_response();
    }

    let reply = match body["type"].as_str() {
        Some("query_balance") => Some(json!({ "balance": guard.balance })),
        Some("query_stats") => Some(json!({ "stats": guard.stats })),
        _ => None,
    };
    guard.effects.push(body);
    match reply {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

// Bind to an ephemeral port and serve the fake bridge on the current runtime.
pub async fn spawn_fake_bridge(initial: BridgeState) -> FakeBridge {
    let state: Shared = Arc::new(Mutex::new(initial));
    let router = Router::new()
        .route("/actors", get(actors))
        .route("/actors/{id}/inventory", get(inventory))
        .route("/inventory-changes", get(inventory_changes))
        .route("/effects", post(effects))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral bridge port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake bridge failed");
    });

    FakeBridge {
        base_url: format!("http://{addr}"),
        state,
    }
}

// Poll `check` until it holds or the deadline passes.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    false
}
