//! Seams between the studio and the A2A transport.
//!
//! [`AgentConnector`] fetches descriptors and builds transports, and
//! [`AgentTransport`] dispatches one message. [`HttpConnector`] backs both
//! with `a2a-client`.

use crate::errors::{StudioError, StudioResult};
use a2a_client::{A2AClient, A2AError};
use a2a_types::{AgentCard, Message, MessageSendParams, SendMessageResult, Task};
use async_trait::async_trait;
use std::sync::Arc;

/// One reply to `message/send`.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    Message(Message),
    Task(Task),
}

impl From<SendMessageResult> for AgentReply {
    fn from(result: SendMessageResult) -> Self {
        match result {
            SendMessageResult::Message(message) => AgentReply::Message(message),
            SendMessageResult::Task(task) => AgentReply::Task(task),
        }
    }
}

/// A connected handle able to send messages to one agent.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    async fn send(&self, params: MessageSendParams) -> StudioResult<AgentReply>;
}

/// Descriptor fetch and transport construction.
#[async_trait]
pub trait AgentConnector: Send + Sync {
    async fn fetch_descriptor(&self, url: &str) -> StudioResult<AgentCard>;

    /// Build a transport bound to the card's advertised URL.
    fn connect(&self, card: &AgentCard) -> StudioResult<Arc<dyn AgentTransport>>;
}

/// Production connector over HTTP.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    http: reqwest::Client,
    auth_token: Option<String>,
}

impl HttpConnector {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl AgentConnector for HttpConnector {
    async fn fetch_descriptor(&self, url: &str) -> StudioResult<AgentCard> {
        A2AClient::fetch_agent_card(&self.http, url)
            .await
            .map_err(|e| StudioError::Connection {
                reason: e.to_string(),
            })
    }

    fn connect(&self, card: &AgentCard) -> StudioResult<Arc<dyn AgentTransport>> {
        let mut client = A2AClient::from_card_with_client(card.clone(), self.http.clone())
            .map_err(|e| StudioError::Connection {
                reason: e.to_string(),
            })?;
        if let Some(token) = &self.auth_token {
            client = client.with_auth_token(token.clone());
        }
        Ok(Arc::new(HttpTransport { client }))
    }
}

struct HttpTransport {
    client: A2AClient,
}

#[async_trait]
impl AgentTransport for HttpTransport {
    async fn send(&self, params: MessageSendParams) -> StudioResult<AgentReply> {
        self.client
            .send_message(params)
            .await
            .map(AgentReply::from)
            .map_err(send_error)
    }
}

fn send_error(error: A2AError) -> StudioError {
    match error {
        A2AError::SerializationError { message } => {
            StudioError::UnexpectedReply { reason: message }
        }
        other => StudioError::Send {
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_rejects_card_without_url() {
        let card = AgentCard::new("Echo", "Echoes", "1.0.0", "");
        let result = HttpConnector::default().connect(&card);
        assert!(matches!(result, Err(StudioError::Connection { .. })));
    }

    #[test]
    fn malformed_reply_maps_to_unexpected_reply() {
        let err = send_error(A2AError::SerializationError {
            message: "result is neither a task nor a message".into(),
        });
        assert!(matches!(err, StudioError::UnexpectedReply { .. }));

        let err = send_error(A2AError::HttpStatus {
            status: 502,
            body: "bad gateway".into(),
        });
        assert!(matches!(err, StudioError::Send { .. }));
    }
}
