//! Message exchange: one user message out, one normalized agent reply back.

use crate::errors::{StudioError, StudioResult};
use crate::parts::{normalize_parts, ConversationPart};
use crate::session::SessionManager;
use crate::tasks::TaskStatus;
use crate::transport::AgentReply;
use a2a_types::{Message, MessageRole, MessageSendParams, Part, Task};

/// Display text used when a reply had no surviving text.
pub const EMPTY_REPLY_TEXT: &str = "Response received";

/// Which branch of the protocol union the agent answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Message,
    Task,
}

/// The normalized result of one exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeOutcome {
    pub text: String,
    /// All normalized parts, populated only when the reply carried file or data content.
    pub parts: Vec<ConversationPart>,
    pub task_id: Option<String>,
    /// Status reported by the agent, or `Completed` for promoted rich replies.
    pub status: Option<TaskStatus>,
    pub reply_kind: ReplyKind,
}

/// Send `text` through the session, optionally continuing `target_task_id`.
pub async fn send_message<S: AsRef<str>>(
    session: &SessionManager,
    text: &str,
    target_task_id: Option<&str>,
    prior_agent_texts: &[S],
) -> StudioResult<ExchangeOutcome> {
    let transport = session.transport().ok_or(StudioError::NotConnected)?;
    if text.trim().is_empty() {
        return Err(StudioError::EmptyMessage);
    }

    let mut message = Message::text(MessageRole::User, uuid::Uuid::new_v4().to_string(), text);
    message.task_id = target_task_id.map(str::to_string);

    tracing::debug!(
        message_id = %message.message_id,
        task_id = ?message.task_id,
        "sending message"
    );

    let reply = transport
        .send(MessageSendParams {
            message,
            configuration: None,
            metadata: None,
        })
        .await?;

    Ok(outcome_from_reply(reply, prior_agent_texts))
}

/// Normalize a reply into an outcome.
pub fn outcome_from_reply<S: AsRef<str>>(
    reply: AgentReply,
    prior_agent_texts: &[S],
) -> ExchangeOutcome {
    let (raw_parts, mut task_id, mut status, reply_kind) = match reply {
        AgentReply::Message(message) => {
            tracing::debug!(parts = message.parts.len(), "agent replied with a message");
            (message.parts, None, None, ReplyKind::Message)
        }
        AgentReply::Task(task) => {
            tracing::debug!(
                task_id = %task.id,
                state = task.status.state.as_str(),
                "agent replied with a task"
            );
            let task_id = if task.id.trim().is_empty() {
                synthesize_task_id()
            } else {
                task.id.clone()
            };
            let status = TaskStatus::from_protocol(&task.status.state);
            (task_parts(task), Some(task_id), Some(status), ReplyKind::Task)
        }
    };

    let normalized = normalize_parts(&raw_parts, prior_agent_texts);
    let is_rich = normalized.iter().any(ConversationPart::is_rich);
    if is_rich && task_id.is_none() {
        let synthesized = synthesize_task_id();
        tracing::debug!(task_id = %synthesized, "rich reply promoted to task");
        task_id = Some(synthesized);
        status = Some(TaskStatus::Completed);
    }

    let texts: Vec<&str> = normalized.iter().filter_map(ConversationPart::as_text).collect();
    let text = if texts.is_empty() {
        EMPTY_REPLY_TEXT.to_string()
    } else {
        texts.join(" ")
    };

    ExchangeOutcome {
        text,
        parts: if is_rich { normalized } else { Vec::new() },
        task_id,
        status,
        reply_kind,
    }
}

/// Parts of the richest non-user history message followed by every artifact's parts.
fn task_parts(task: Task) -> Vec<Part> {
    let mut richest: Option<Message> = None;
    for message in task.history {
        if message.role == MessageRole::User {
            continue;
        }
        // Strictly greater, so the first of equally rich messages wins.
        if richest
            .as_ref()
            .map_or(true, |r| message.parts.len() > r.parts.len())
        {
            richest = Some(message);
        }
    }

    let mut parts = richest.map(|m| m.parts).unwrap_or_default();
    for artifact in task.artifacts {
        parts.extend(artifact.parts);
    }
    parts
}

fn synthesize_task_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
