//! Shared utilities for integration testing.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use transfer_submitter::config::NetworkConfig;

/// Handler deciding the answer to each JSON-RPC call.
///
/// `Ok` becomes `result`, `Err((code, message))` becomes `error`.
pub type RpcHandler = Arc<dyn Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + Sync>;

async fn dispatch(State(handler): State<RpcHandler>, Json(body): Json<Value>) -> Json<Value> {
    let id = body.get("id").cloned().unwrap_or(Value::Null);
    let method = body.get("method").and_then(Value::as_str).unwrap_or_default();
    let params = body.get("params").cloned().unwrap_or(Value::Null);

    let response = match handler(method, &params) {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message }
        }),
    };
    Json(response)
}

/// Start a programmable mock RPC node on an ephemeral port.
pub async fn start_mock_rpc<F>(f: F) -> SocketAddr
where
    F: Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + Sync + 'static,
{
    let handler: RpcHandler = Arc::new(f);
    let app = Router::new().route("/", post(dispatch)).with_state(handler);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Network config pointed at `addr` with short test timings.
pub fn network_config(addr: SocketAddr) -> NetworkConfig {
    NetworkConfig {
        rpc_url: format!("http://{}", addr),
        rpc_timeout_secs: 2,
        confirm_timeout_secs: 2,
        poll_interval_ms: 20,
        ..NetworkConfig::default()
    }
}

/// `{ context, value }` wrapper used by most read methods.
#[allow(dead_code)]
pub fn contextual(value: Value) -> Value {
    json!({ "context": { "slot": 1 }, "value": value })
}
