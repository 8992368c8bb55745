//! Session management.
//!
//! A [`SessionManager`] holds at most one live session: the fetched card, its
//! validation outcome and a transport bound to the card's own URL.

use crate::errors::{StudioError, StudioResult};
use crate::transport::{AgentConnector, AgentTransport};
use crate::validation::{validate, ValidationOutcome};
use a2a_types::AgentCard;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// A skill as shown in the session summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillSummary {
    pub name: String,
    pub description: String,
}

/// Summary of the connected agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionInfo {
    pub name: String,
    pub description: String,
    pub version: String,
    pub url: String,
    /// Labels for the capability flags the card sets to true.
    pub capabilities: Vec<String>,
    pub skills: Vec<SkillSummary>,
    pub last_updated: DateTime<Utc>,
    pub is_connected: bool,
    pub validation: ValidationOutcome,
}

impl SessionInfo {
    fn from_card(card: &AgentCard, validation: ValidationOutcome) -> Self {
        let flags = [
            (card.capabilities.streaming, "Streaming"),
            (card.capabilities.push_notifications, "Push Notifications"),
            (
                card.capabilities.state_transition_history,
                "State Transition History",
            ),
        ];
        let capabilities = flags
            .into_iter()
            .filter(|(flag, _)| flag.unwrap_or(false))
            .map(|(_, label)| label.to_string())
            .collect();

        Self {
            name: card.name.clone(),
            description: card.description.clone(),
            version: card.version.clone(),
            url: card.url.clone(),
            capabilities,
            skills: card
                .skills
                .iter()
                .map(|s| SkillSummary {
                    name: s.name.clone(),
                    description: s.description.clone(),
                })
                .collect(),
            last_updated: Utc::now(),
            is_connected: true,
            validation,
        }
    }
}

struct Session {
    card: AgentCard,
    info: SessionInfo,
    transport: Arc<dyn AgentTransport>,
}

pub struct SessionManager {
    connector: Arc<dyn AgentConnector>,
    session: Option<Session>,
}

impl SessionManager {
    pub fn new(connector: Arc<dyn AgentConnector>) -> Self {
        Self {
            connector,
            session: None,
        }
    }

    /// Connect to the agent published at `url`, replacing any current session.
    ///
    /// The previous session is dropped before anything else happens, so a
    /// failed attempt leaves the manager disconnected.
    pub async fn connect(&mut self, url: &str) -> StudioResult<SessionInfo> {
        self.disconnect();

        let url = url.trim();
        if url.is_empty() {
            return Err(StudioError::InvalidInput {
                reason: "Agent URL is required".to_string(),
            });
        }
        if url::Url::parse(url).is_err() {
            return Err(StudioError::InvalidInput {
                reason: format!("'{}' is not an absolute URL", url),
            });
        }

        tracing::info!(url, "connecting to agent");
        let card = self.connector.fetch_descriptor(url).await?;

        let validation = validate(&card);
        if !validation.is_valid() {
            tracing::warn!(
                agent = %card.name,
                errors = ?validation.errors,
                "agent card failed validation"
            );
        }

        let transport = self.connector.connect(&card)?;
        let info = SessionInfo::from_card(&card, validation);
        tracing::info!(agent = %info.name, endpoint = %info.url, "connected");

        self.session = Some(Session {
            card,
            info: info.clone(),
            transport,
        });
        Ok(info)
    }

    pub fn disconnect(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(agent = %session.info.name, "disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn current_agent(&self) -> Option<&SessionInfo> {
        self.session.as_ref().map(|s| &s.info)
    }

    pub fn agent_card(&self) -> Option<&AgentCard> {
        self.session.as_ref().map(|s| &s.card)
    }

    /// The connected card as indented JSON.
    pub fn agent_card_json(&self) -> Option<String> {
        self.agent_card()
            .and_then(|card| serde_json::to_string_pretty(card).ok())
    }

    pub fn transport(&self) -> Option<Arc<dyn AgentTransport>> {
        self.session.as_ref().map(|s| Arc::clone(&s.transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::AgentReply;
    use a2a_types::MessageSendParams;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullTransport;

    #[async_trait]
    impl AgentTransport for NullTransport {
        async fn send(&self, _params: MessageSendParams) -> StudioResult<AgentReply> {
            Err(StudioError::Send {
                reason: "unused".into(),
            })
        }
    }

    struct StaticConnector {
        card: Option<AgentCard>,
        fetches: AtomicUsize,
    }

    impl StaticConnector {
        fn new(card: Option<AgentCard>) -> Arc<Self> {
            Arc::new(Self {
                card,
                fetches: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AgentConnector for StaticConnector {
        async fn fetch_descriptor(&self, _url: &str) -> StudioResult<AgentCard> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.card.clone().ok_or_else(|| StudioError::Connection {
                reason: "connection refused".into(),
            })
        }

        fn connect(&self, _card: &AgentCard) -> StudioResult<Arc<dyn AgentTransport>> {
            Ok(Arc::new(NullTransport))
        }
    }

    fn card() -> AgentCard {
        AgentCard::new("Echo", "Echoes", "1.0.0", "http://127.0.0.1:9/rpc")
            .with_streaming(true)
            .with_state_transition_history(true)
    }

    #[tokio::test]
    async fn blank_and_relative_urls_never_reach_the_network() {
        let connector = StaticConnector::new(Some(card()));
        let mut manager = SessionManager::new(connector.clone());

        for input in ["", "   ", "localhost-without-scheme", "/relative"] {
            let err = manager.connect(input).await.unwrap_err();
            assert!(matches!(err, StudioError::InvalidInput { .. }), "{input}");
        }
        assert_eq!(connector.fetches.load(Ordering::SeqCst), 0);
        assert!(!manager.is_connected());
    }

    #[tokio::test]
    async fn connect_builds_session_info() {
        let mut manager = SessionManager::new(StaticConnector::new(Some(card())));
        let info = manager.connect("http://localhost:5000").await.unwrap();

        assert!(manager.is_connected());
        assert_eq!(info.url, "http://127.0.0.1:9/rpc");
        assert_eq!(
            info.capabilities,
            vec!["Streaming", "State Transition History"]
        );
        assert!(info.validation.is_valid());
        assert_eq!(manager.current_agent(), Some(&info));
        assert!(manager.agent_card_json().unwrap().contains("\"name\": \"Echo\""));
    }

    #[tokio::test]
    async fn failed_connect_drops_previous_session() {
        let mut manager = SessionManager::new(StaticConnector::new(Some(card())));
        manager.connect("http://localhost:5000").await.unwrap();

        manager.connect("").await.unwrap_err();
        assert!(!manager.is_connected());
        assert!(manager.current_agent().is_none());
        assert!(manager.transport().is_none());
    }

    #[tokio::test]
    async fn fetch_failure_is_a_connection_error() {
        let mut manager = SessionManager::new(StaticConnector::new(None));
        let err = manager.connect("http://localhost:5000").await.unwrap_err();

        assert!(matches!(err, StudioError::Connection { .. }));
        assert!(!manager.is_connected());
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let mut manager = SessionManager::new(StaticConnector::new(Some(card())));
        manager.connect("http://localhost:5000").await.unwrap();

        manager.disconnect();
        manager.disconnect();
        assert!(!manager.is_connected());
    }
}
