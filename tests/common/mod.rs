//! Scripted connector and transport shared by the studio tests.

#![allow(dead_code)]

use a2a_studio::a2a_types::{
    AgentCard, Artifact, FileContent, FileWithBytes, Message, MessageRole, MessageSendParams,
    Part, Task, TaskState, TaskStatus,
};
use a2a_studio::{AgentConnector, AgentReply, AgentTransport, StudioError, StudioResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Replays queued replies and records every request it receives.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<VecDeque<StudioResult<AgentReply>>>,
    sent: Mutex<Vec<MessageSendParams>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_reply(&self, reply: AgentReply) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    pub fn push_error(&self, error: StudioError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn sent(&self) -> Vec<MessageSendParams> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_task_id(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .and_then(|p| p.message.task_id.clone())
    }
}

#[async_trait]
impl AgentTransport for FakeTransport {
    async fn send(&self, params: MessageSendParams) -> StudioResult<AgentReply> {
        self.sent.lock().unwrap().push(params);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(StudioError::Send {
                    reason: "no scripted reply left".to_string(),
                })
            })
    }
}

/// Never answers, like an agent that hangs after accepting the request.
pub struct PendingTransport;

#[async_trait]
impl AgentTransport for PendingTransport {
    async fn send(&self, _params: MessageSendParams) -> StudioResult<AgentReply> {
        std::future::pending().await
    }
}

/// Serves one card, or a connection failure, and hands out the shared transport.
pub struct FakeConnector {
    card: Option<AgentCard>,
    transport: Arc<dyn AgentTransport>,
    fetches: AtomicUsize,
}

impl FakeConnector {
    pub fn new(card: AgentCard, transport: Arc<dyn AgentTransport>) -> Arc<Self> {
        Arc::new(Self {
            card: Some(card),
            transport,
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            card: None,
            transport: FakeTransport::new(),
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentConnector for FakeConnector {
    async fn fetch_descriptor(&self, url: &str) -> StudioResult<AgentCard> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.card.clone().ok_or_else(|| StudioError::Connection {
            reason: format!("{url} is unreachable"),
        })
    }

    fn connect(&self, _card: &AgentCard) -> StudioResult<Arc<dyn AgentTransport>> {
        Ok(self.transport.clone())
    }
}

pub fn card(name: &str) -> AgentCard {
    AgentCard::new(name, "Scripted test agent", "1.0.0", "http://agent.test/")
}

pub fn message_reply(parts: Vec<Part>) -> AgentReply {
    AgentReply::Message(Message {
        kind: "message".to_string(),
        message_id: uuid::Uuid::new_v4().to_string(),
        role: MessageRole::Agent,
        parts,
        context_id: None,
        task_id: None,
        reference_task_ids: Vec::new(),
        metadata: None,
    })
}

pub fn text_reply(text: &str) -> AgentReply {
    message_reply(vec![Part::text(text)])
}

pub fn task_reply(id: &str, state: TaskState, parts: Vec<Part>) -> AgentReply {
    AgentReply::Task(Task {
        kind: "task".to_string(),
        id: id.to_string(),
        context_id: "ctx-1".to_string(),
        status: TaskStatus {
            state,
            timestamp: None,
            message: None,
        },
        history: Vec::new(),
        artifacts: vec![Artifact {
            artifact_id: format!("{id}-result"),
            parts,
            name: None,
            description: None,
        }],
        metadata: None,
    })
}

pub fn svg_part() -> Part {
    Part::file(FileContent::WithBytes(FileWithBytes {
        // "<svg/>"
        bytes: "PHN2Zy8+".to_string(),
        mime_type: Some("image/svg+xml".to_string()),
        name: Some("chart.svg".to_string()),
    }))
}
