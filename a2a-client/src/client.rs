//! A2A Client for calling remote A2A agents
//!
//! This module provides a client for making A2A protocol calls to remote agents
//! over JSON-RPC 2.0. Only request/response interactions are supported; the
//! client performs no retries and carries no timeout of its own, both come from
//! the `reqwest::Client` the caller hands in.

use crate::constants::{
    AGENT_CARD_PATH, JSONRPC_VERSION, METHOD_MESSAGE_SEND, METHOD_TASKS_CANCEL, METHOD_TASKS_GET,
};
use crate::error::{A2AError, A2AResult};
use a2a_types::{
    AgentCard, JSONRPCErrorResponse, JSONRPCId, MessageSendParams, SendMessageResult, Task,
    TaskIdParams, TaskQueryParams,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A2A client for communicating with remote agents
#[derive(Clone)]
pub struct A2AClient {
    /// HTTP client for making requests
    client: Client,
    /// Service endpoint URL from agent card
    service_endpoint_url: String,
    /// Optional authentication token
    auth_token: Option<String>,
    /// Request ID counter for JSON-RPC requests
    request_id_counter: Arc<AtomicU64>,
    /// Cached agent card
    agent_card: Arc<AgentCard>,
}

impl std::fmt::Debug for A2AClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("A2AClient")
            .field("service_endpoint_url", &self.service_endpoint_url)
            .field("agent", &self.agent_card.name)
            .field("authenticated", &self.auth_token.is_some())
            .finish()
    }
}

/// JSON-RPC 2.0 request structure
#[derive(Debug, Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: String,
    id: JSONRPCId,
    method: String,
    params: T,
}

/// Success half of a JSON-RPC 2.0 response
#[derive(Debug, Deserialize)]
struct JsonRpcSuccess<T> {
    id: Option<JSONRPCId>,
    result: T,
}

/// Resolve the URL the agent card is published at.
///
/// A URL that already names a `.json` document is used verbatim; anything else
/// is treated as the agent's base URL and the well-known path is appended.
pub fn agent_card_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with(".json") {
        trimmed.to_string()
    } else {
        format!("{}/{}", trimmed, AGENT_CARD_PATH)
    }
}

impl A2AClient {
    /// Create a new A2A client from an agent card URL
    ///
    /// This will fetch the agent card from the specified URL and use the
    /// service endpoint URL from the card for all subsequent requests.
    pub async fn from_card_url(base_url: impl AsRef<str>) -> A2AResult<Self> {
        Self::from_card_url_with_client(base_url, Client::new()).await
    }

    /// Create a new A2A client from an agent card URL with a custom HTTP client
    ///
    /// ```no_run
    /// use a2a_client::A2AClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()?;
    ///
    /// let client = A2AClient::from_card_url_with_client(
    ///     "http://localhost:5000",
    ///     http_client
    /// ).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn from_card_url_with_client(
        base_url: impl AsRef<str>,
        http_client: Client,
    ) -> A2AResult<Self> {
        let agent_card = Self::fetch_agent_card(&http_client, base_url).await?;
        Self::from_card_with_client(agent_card, http_client)
    }

    /// Fetch the agent card published at `base_url` without building a client.
    pub async fn fetch_agent_card(
        http_client: &Client,
        base_url: impl AsRef<str>,
    ) -> A2AResult<AgentCard> {
        let card_url = agent_card_url(base_url.as_ref());
        tracing::debug!(card_url = %card_url, "fetching agent card");

        let response = http_client
            .get(&card_url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| A2AError::NetworkError {
                message: format!("Failed to fetch agent card from {}: {}", card_url, e),
            })?;

        if !response.status().is_success() {
            return Err(A2AError::NetworkError {
                message: format!("Failed to fetch agent card: HTTP {}", response.status()),
            });
        }

        response
            .json()
            .await
            .map_err(|e| A2AError::SerializationError {
                message: format!("Failed to parse agent card: {}", e),
            })
    }

    /// Create a new A2A client directly from an agent card
    pub fn from_card(agent_card: AgentCard) -> A2AResult<Self> {
        Self::from_card_with_client(agent_card, Client::new())
    }

    /// Create a new A2A client from an agent card with a custom HTTP client
    ///
    /// The client talks to the endpoint the card advertises, which may differ
    /// from the URL the card was fetched from.
    pub fn from_card_with_client(agent_card: AgentCard, http_client: Client) -> A2AResult<Self> {
        if agent_card.url.trim().is_empty() {
            return Err(A2AError::InvalidParameter {
                message: "Agent card does not contain a valid 'url' for the service endpoint"
                    .to_string(),
            });
        }

        Ok(Self {
            client: http_client,
            service_endpoint_url: agent_card.url.clone(),
            auth_token: None,
            request_id_counter: Arc::new(AtomicU64::new(1)),
            agent_card: Arc::new(agent_card),
        })
    }

    /// Create a new A2A client from an agent card with custom headers
    ///
    /// ```no_run
    /// use a2a_client::A2AClient;
    /// use a2a_types::AgentCard;
    /// use std::collections::HashMap;
    ///
    /// # fn example(agent_card: AgentCard) -> Result<(), Box<dyn std::error::Error>> {
    /// let mut headers = HashMap::new();
    /// headers.insert("X-API-Key".to_string(), "my-api-key".to_string());
    ///
    /// let client = A2AClient::from_card_with_headers(agent_card, headers)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_card_with_headers(
        agent_card: AgentCard,
        headers: std::collections::HashMap<String, String>,
    ) -> A2AResult<Self> {
        let http_client = Client::builder()
            .default_headers(header_map(&headers)?)
            .build()
            .map_err(|e| A2AError::NetworkError {
                message: format!("Failed to build HTTP client with headers: {}", e),
            })?;

        Self::from_card_with_client(agent_card, http_client)
    }

    /// Set authentication token (builder pattern)
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Get the cached agent card
    pub fn agent_card(&self) -> &AgentCard {
        &self.agent_card
    }

    /// The endpoint JSON-RPC requests are posted to
    pub fn service_endpoint_url(&self) -> &str {
        &self.service_endpoint_url
    }

    fn next_request_id(&self) -> JSONRPCId {
        let id = self.request_id_counter.fetch_add(1, Ordering::SeqCst);
        JSONRPCId::Integer(id as i64)
    }

    /// Inject W3C Trace Context into HTTP headers for distributed tracing
    ///
    /// Extracts the OpenTelemetry context from the current tracing span so the
    /// remote agent can join the caller's trace. Without an installed
    /// propagator this yields no headers.
    fn inject_trace_context() -> std::collections::HashMap<String, String> {
        use opentelemetry::global;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let mut carrier = std::collections::HashMap::new();
        let context = tracing::Span::current().context();

        global::get_text_map_propagator(|propagator| {
            propagator.inject_context(&context, &mut carrier);
        });

        carrier
    }

    /// Post one JSON-RPC request and decode its `result` as `TResponse`.
    async fn post_rpc_request<TParams, TResponse>(
        &self,
        method: &str,
        params: TParams,
    ) -> A2AResult<TResponse>
    where
        TParams: Serialize,
        TResponse: for<'de> Deserialize<'de>,
    {
        let request_id = self.next_request_id();
        let rpc_request = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
            id: request_id.clone(),
        };

        let mut req = self
            .client
            .post(&self.service_endpoint_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&rpc_request);

        for (key, value) in Self::inject_trace_context() {
            req = req.header(key, value);
        }

        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await.map_err(|e| A2AError::NetworkError {
            message: format!("Failed to send {} request: {}", method, e),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| A2AError::NetworkError {
            message: format!("Failed to read {} response: {}", method, e),
        })?;

        // Error objects may arrive with a non-2xx status; prefer their message.
        if let Ok(error_response) = serde_json::from_str::<JSONRPCErrorResponse>(&body) {
            return Err(A2AError::RemoteAgentError {
                message: error_response.error.message,
                code: Some(error_response.error.code),
            });
        }

        if !status.is_success() {
            return Err(A2AError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let success: JsonRpcSuccess<TResponse> =
            serde_json::from_str(&body).map_err(|e| A2AError::SerializationError {
                message: format!("Failed to parse {} response: {}", method, e),
            })?;

        if let Some(resp_id) = &success.id {
            if resp_id != &request_id {
                tracing::warn!(
                    method,
                    expected = ?request_id,
                    received = ?resp_id,
                    "RPC response ID mismatch"
                );
            }
        }

        Ok(success.result)
    }

    /// Send a message to the remote agent (non-streaming)
    ///
    /// The agent answers with either a direct message or a task snapshot.
    pub async fn send_message(&self, params: MessageSendParams) -> A2AResult<SendMessageResult> {
        self.post_rpc_request(METHOD_MESSAGE_SEND, params).await
    }

    /// Get a specific task from the remote agent
    pub async fn get_task(&self, params: TaskQueryParams) -> A2AResult<Task> {
        self.post_rpc_request(METHOD_TASKS_GET, params).await
    }

    /// Cancel a task by its ID
    pub async fn cancel_task(&self, params: TaskIdParams) -> A2AResult<Task> {
        self.post_rpc_request(METHOD_TASKS_CANCEL, params).await
    }
}

/// Build a header map from name/value pairs, rejecting invalid names and values
pub fn header_map(
    headers: &std::collections::HashMap<String, String>,
) -> A2AResult<reqwest::header::HeaderMap> {
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
    use std::str::FromStr;

    let mut header_map = HeaderMap::new();
    for (key, value) in headers {
        let header_name = HeaderName::from_str(key).map_err(|e| A2AError::InvalidParameter {
            message: format!("Invalid header name '{}': {}", key, e),
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| A2AError::InvalidParameter {
            message: format!("Invalid header value for '{}': {}", key, e),
        })?;
        header_map.insert(header_name, header_value);
    }
    Ok(header_map)
}
