//! Echo behaviour and the in-memory task store.
//!
//! Plain texts are answered with a direct message. A text starting `TASK:`, or
//! `TASK(<state>):`, or a message that names an existing task or carries the
//! `task-target-state` metadata key, is handled as a task whose latest artifact
//! holds an echo text, an SVG report and a JSON analysis.

use crate::error::{Error, Result};
use a2a_types::{
    AgentCard, Artifact, FileContent, FileWithBytes, Message, MessageRole, MessageSendParams,
    Part, SendMessageResult, Task, TaskIdParams, TaskQueryParams, TaskState, TaskStatus,
};
use base64::Engine;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::json;

/// Metadata key a client sets to choose the state a task ends in.
pub const TARGET_STATE_METADATA_KEY: &str = "task-target-state";

const TASK_PREFIX: &str = "TASK";

/// The default card, advertising `url` as the JSON-RPC endpoint.
pub fn default_card(url: impl Into<String>) -> AgentCard {
    AgentCard::new(
        "Echo Agent Demo",
        "A simple demonstration agent that echoes back any message it receives",
        env!("CARGO_PKG_VERSION"),
        url,
    )
    .with_streaming(false)
    .with_push_notifications(false)
    .with_state_transition_history(false)
    .add_output_mode("image/svg+xml")
    .add_output_mode("application/json")
    .add_skill_with("echo", "Echo", |s| {
        s.with_description("Echoes back the received message")
            .add_tag("demo")
            .add_example("hello")
    })
    .add_skill_with("echo-task", "Echo Task", |s| {
        s.with_description("Runs the message as a task and returns a visual report")
            .add_tag("demo")
            .add_tag("task")
            .add_example("TASK: summarize this")
            .add_example("TASK(input-required): ask me something")
    })
}

pub struct EchoAgent {
    card: AgentCard,
    tasks: DashMap<String, Task>,
}

impl EchoAgent {
    pub fn new(card: AgentCard) -> Self {
        Self {
            card,
            tasks: DashMap::new(),
        }
    }

    pub fn card(&self) -> &AgentCard {
        &self.card
    }

    /// Handle `message/send`.
    pub fn send_message(&self, params: MessageSendParams) -> Result<SendMessageResult> {
        let message = params.message;
        let text = message
            .parts
            .iter()
            .find_map(Part::as_text)
            .ok_or_else(|| Error::InvalidParams("Message must contain a text part".to_string()))?
            .to_string();

        let directive = parse_directive(&text)?;
        let metadata_state = target_state_from_metadata(&message)?;

        let wants_task =
            directive.is_some() || message.task_id.is_some() || metadata_state.is_some();
        if !wants_task {
            tracing::debug!(message_id = %message.message_id, "echoing direct message");
            return Ok(SendMessageResult::Message(echo_message(&message, &text)));
        }

        let (body, directive_state) = match directive {
            Some((body, state)) => (body, state),
            None => (text.trim().to_string(), None),
        };
        let state = directive_state
            .or(metadata_state)
            .unwrap_or(TaskState::Completed);

        let task = match message.task_id.clone() {
            Some(task_id) => self.continue_task(&task_id, message, &body, state)?,
            None => self.create_task(message, &body, state),
        };
        Ok(SendMessageResult::Task(task))
    }

    /// Handle `tasks/get`.
    pub fn get_task(&self, params: TaskQueryParams) -> Result<Task> {
        let mut task = self
            .tasks
            .get(&params.id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::TaskNotFound(params.id.clone()))?;

        if let Some(limit) = params.history_length {
            let keep = usize::try_from(limit).unwrap_or(0);
            let skip = task.history.len().saturating_sub(keep);
            task.history.drain(..skip);
        }
        Ok(task)
    }

    /// Handle `tasks/cancel`.
    pub fn cancel_task(&self, params: TaskIdParams) -> Result<Task> {
        let mut entry = self
            .tasks
            .get_mut(&params.id)
            .ok_or_else(|| Error::TaskNotFound(params.id.clone()))?;

        if entry.status.state.is_final() {
            return Err(Error::TaskNotCancelable(format!(
                "{} is already {}",
                params.id,
                entry.status.state.as_str()
            )));
        }

        entry.status = status(TaskState::Canceled);
        tracing::info!(task_id = %params.id, "task canceled");
        Ok(entry.value().clone())
    }

    fn create_task(&self, mut message: Message, body: &str, state: TaskState) -> Task {
        let task_id = uuid::Uuid::new_v4().to_string();
        let context_id = message
            .context_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        message.task_id = Some(task_id.clone());
        message.context_id = Some(context_id.clone());

        let task = Task {
            kind: a2a_types::TASK_KIND.to_string(),
            id: task_id.clone(),
            context_id,
            status: status(state),
            history: vec![message],
            artifacts: vec![task_artifact(body, &task_id)],
            metadata: None,
        };

        tracing::info!(task_id = %task_id, state = task.status.state.as_str(), "task created");
        self.tasks.insert(task_id, task.clone());
        task
    }

    fn continue_task(
        &self,
        task_id: &str,
        mut message: Message,
        body: &str,
        state: TaskState,
    ) -> Result<Task> {
        let mut entry = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;

        message.context_id = Some(entry.context_id.clone());
        entry.history.push(message);
        entry.artifacts = vec![task_artifact(body, task_id)];
        entry.status = status(state);

        tracing::info!(task_id, state = entry.status.state.as_str(), "task continued");
        Ok(entry.value().clone())
    }
}

/// Split `TASK: body` or `TASK(state): body` into its body and optional state.
fn parse_directive(text: &str) -> Result<Option<(String, Option<TaskState>)>> {
    let trimmed = text.trim_start();
    let Some(head) = trimmed.get(..TASK_PREFIX.len()) else {
        return Ok(None);
    };
    if !head.eq_ignore_ascii_case(TASK_PREFIX) {
        return Ok(None);
    }

    let rest = &trimmed[TASK_PREFIX.len()..];
    if let Some(body) = rest.strip_prefix(':') {
        return Ok(Some((body.trim().to_string(), None)));
    }

    let Some(inner) = rest.strip_prefix('(') else {
        return Ok(None);
    };
    let Some((raw_state, body)) = inner.split_once("):") else {
        return Ok(None);
    };
    let state = parse_state(raw_state)
        .ok_or_else(|| Error::InvalidParams(format!("Unknown task state '{}'", raw_state)))?;
    Ok(Some((body.trim().to_string(), Some(state))))
}

fn target_state_from_metadata(message: &Message) -> Result<Option<TaskState>> {
    let Some(value) = message
        .metadata
        .as_ref()
        .and_then(|m| m.get(TARGET_STATE_METADATA_KEY))
    else {
        return Ok(None);
    };

    let raw = value.as_str().ok_or_else(|| {
        Error::InvalidParams(format!("'{}' must be a string", TARGET_STATE_METADATA_KEY))
    })?;
    parse_state(raw)
        .map(Some)
        .ok_or_else(|| Error::InvalidParams(format!("Unknown task state '{}'", raw)))
}

/// Case-insensitive state name, accepting `input-required`, `InputRequired` and `input_required`.
fn parse_state(raw: &str) -> Option<TaskState> {
    let key: String = raw
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect::<String>()
        .to_ascii_lowercase();

    let state = match key.as_str() {
        "submitted" => TaskState::Submitted,
        "working" => TaskState::Working,
        "inputrequired" => TaskState::InputRequired,
        "completed" => TaskState::Completed,
        "canceled" | "cancelled" => TaskState::Canceled,
        "failed" => TaskState::Failed,
        "rejected" => TaskState::Rejected,
        "authrequired" => TaskState::AuthRequired,
        _ => return None,
    };
    Some(state)
}

fn status(state: TaskState) -> TaskStatus {
    TaskStatus {
        state,
        timestamp: Some(Utc::now().to_rfc3339()),
        message: None,
    }
}

fn echo_message(request: &Message, text: &str) -> Message {
    let mut reply = Message::text(
        MessageRole::Agent,
        uuid::Uuid::new_v4().to_string(),
        format!("ECHO MESSAGE: {}", text),
    );
    reply.context_id = request.context_id.clone();
    reply
}

fn task_artifact(body: &str, task_id: &str) -> Artifact {
    let svg = result_svg(body, task_id);
    Artifact {
        artifact_id: uuid::Uuid::new_v4().to_string(),
        parts: vec![
            Part::text(format!("ECHO TASK COMPLETED: {}", body)),
            Part::file(FileContent::WithBytes(FileWithBytes {
                bytes: base64::engine::general_purpose::STANDARD.encode(svg.as_bytes()),
                mime_type: Some("image/svg+xml".to_string()),
                name: Some("task_result.svg".to_string()),
            })),
            Part::data(result_data(body, task_id)),
        ],
        name: Some("task-result".to_string()),
        description: Some("Echo of the task request with a visual summary".to_string()),
    }
}

fn result_svg(body: &str, task_id: &str) -> String {
    let generated = Utc::now().format("%Y-%m-%d %H:%M:%S");
    let length = body.chars().count();
    let bar = (length * 5).min(360);
    let short_id: String = task_id.chars().take(8).collect();

    format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg width="400" height="200" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <linearGradient id="grad" x1="0%" y1="0%" x2="100%" y2="100%">
      <stop offset="0%" style="stop-color:#4fc3f7;stop-opacity:1" />
      <stop offset="100%" style="stop-color:#29b6f6;stop-opacity:1" />
    </linearGradient>
  </defs>
  <rect width="400" height="200" fill="url(#grad)" rx="10" ry="10"/>
  <text x="20" y="40" font-family="Arial, sans-serif" font-size="18" font-weight="bold" fill="white">Task Result Visualization</text>
  <text x="20" y="70" font-family="Arial, sans-serif" font-size="12" fill="white">Task ID: {short_id}</text>
  <text x="20" y="90" font-family="Arial, sans-serif" font-size="12" fill="white">Generated: {generated}</text>
  <text x="20" y="110" font-family="Arial, sans-serif" font-size="12" fill="white">Message Length: {length} characters</text>
  <rect x="20" y="130" width="{bar}" height="15" fill="rgba(255,255,255,0.8)" rx="7" ry="7"/>
  <text x="20" y="170" font-family="Arial, sans-serif" font-size="10" fill="white">Echo Agent - Task Processing Complete</text>
</svg>
"##
    )
}

fn result_data(body: &str, task_id: &str) -> serde_json::Value {
    json!({
        "taskId": task_id,
        "status": "completed",
        "timestamp": Utc::now().to_rfc3339(),
        "input": {
            "message": body,
            "length": body.chars().count(),
            "wordCount": body.split_whitespace().count(),
        },
        "processing": {
            "agent": "echo-agent",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "output": {
            "echo": format!("ECHO TASK COMPLETED: {}", body),
            "characterAnalysis": {
                "uppercaseCount": body.chars().filter(|c| c.is_uppercase()).count(),
                "lowercaseCount": body.chars().filter(|c| c.is_lowercase()).count(),
                "digitCount": body.chars().filter(|c| c.is_ascii_digit()).count(),
                "spaceCount": body.chars().filter(|c| c.is_whitespace()).count(),
            }
        }
    })
}
