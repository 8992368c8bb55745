use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::{
    agent::EchoAgent,
    error::{Error, Result},
    json_rpc::{parse_params, validate_request, JsonRpcRequest, JsonRpcResponse},
};

/// State shared across all routes
#[derive(Clone)]
pub struct ServerState {
    pub agent: Arc<EchoAgent>,
}

/// Create the card and JSON-RPC routes
pub fn create_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", post(json_rpc))
        .route("/.well-known/agent-card.json", get(agent_card))
        .with_state(state)
}

/// Single JSON-RPC endpoint dispatching on `method`
async fn json_rpc(State(state): State<ServerState>, body: Bytes) -> Result<Json<JsonRpcResponse>> {
    let request: JsonRpcRequest = serde_json::from_slice(&body)?;
    validate_request(&request)?;

    let id = request.id.clone();
    let method = request.method.clone();
    tracing::debug!(%method, "handling JSON-RPC request");

    let result = match method.as_str() {
        "message/send" => serde_json::to_value(state.agent.send_message(parse_params(request)?)?)?,
        "tasks/get" => serde_json::to_value(state.agent.get_task(parse_params(request)?)?)?,
        "tasks/cancel" => serde_json::to_value(state.agent.cancel_task(parse_params(request)?)?)?,
        other => return Err(Error::MethodNotFound(other.to_string())),
    };

    Ok(Json(JsonRpcResponse::success(id, result)))
}

async fn agent_card(State(state): State<ServerState>) -> Json<a2a_types::AgentCard> {
    Json(state.agent.card().clone())
}
