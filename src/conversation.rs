//! The conversation log and the [`Studio`] that drives it.

use crate::errors::{StudioError, StudioResult};
use crate::exchange::{self, ExchangeOutcome};
use crate::parts::ConversationPart;
use crate::session::{SessionInfo, SessionManager};
use crate::tasks::{self, detect_status_from_text, AvailableTask, TaskStatus, TaskTracker};
use crate::transport::AgentConnector;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TurnOrigin {
    User,
    Agent,
}

/// Link from a turn to the task it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskLink {
    pub task_id: String,
    pub status: TaskStatus,
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub text: String,
    pub origin: TurnOrigin,
    pub timestamp: DateTime<Utc>,
    pub task: Option<TaskLink>,
    pub parts: Vec<ConversationPart>,
    /// Inline error shown in place of an agent reply.
    pub is_error: bool,
}

impl Turn {
    pub fn user(text: impl Into<String>, task: Option<TaskLink>) -> Self {
        Self {
            text: text.into(),
            origin: TurnOrigin::User,
            timestamp: Utc::now(),
            task,
            parts: Vec::new(),
            is_error: false,
        }
    }

    pub fn agent(
        text: impl Into<String>,
        task: Option<TaskLink>,
        parts: Vec<ConversationPart>,
    ) -> Self {
        Self {
            text: text.into(),
            origin: TurnOrigin::Agent,
            timestamp: Utc::now(),
            task,
            parts,
            is_error: false,
        }
    }

    pub fn error(error: &StudioError) -> Self {
        Self {
            is_error: true,
            ..Self::agent(format!("Error: {}", error), None, Vec::new())
        }
    }

    pub fn is_from_user(&self) -> bool {
        self.origin == TurnOrigin::User
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task.as_ref().map(|l| l.task_id.as_str())
    }
}

/// Append-only turn log plus task selection.
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
    tracker: TaskTracker,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn clear(&mut self) {
        self.turns.clear();
        self.tracker.clear();
    }

    /// Refresh the selection and list open tasks, most recent first.
    pub fn available_tasks(&mut self) -> Vec<AvailableTask> {
        self.tracker.refresh(&self.turns)
    }

    pub fn selected_task(&self) -> Option<&str> {
        self.tracker.selected()
    }

    pub fn select_task(&mut self, task_id: &str) -> StudioResult<()> {
        self.tracker.select(task_id, &self.turns)
    }

    pub fn task_turns(&self, task_id: &str) -> Vec<&Turn> {
        tasks::task_turns(&self.turns, task_id)
    }

    /// Texts of earlier agent replies, for deduplicating the next one.
    pub fn prior_agent_texts(&self) -> Vec<String> {
        self.turns
            .iter()
            .filter(|t| !t.is_from_user() && !t.is_error && !t.text.trim().is_empty())
            .map(|t| t.text.clone())
            .collect()
    }

    /// Link the most recent user turn to a task revealed by the reply.
    fn link_last_user_turn(&mut self, task_id: &str) {
        if let Some(turn) = self.turns.iter_mut().rev().find(|t| t.is_from_user()) {
            if turn.task.is_none() {
                turn.task = Some(TaskLink {
                    task_id: task_id.to_string(),
                    status: TaskStatus::in_progress(),
                });
            }
        }
    }
}

/// Marks a send as outstanding until it finishes or its future is dropped.
///
/// A dropped send leaves an error turn after the user turn it started.
struct InFlight<'a> {
    busy: &'a mut bool,
    conversation: &'a mut Conversation,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn start(busy: &'a mut bool, conversation: &'a mut Conversation) -> Self {
        *busy = true;
        Self {
            busy,
            conversation,
            finished: false,
        }
    }

    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.busy = false;
        if !self.finished {
            let error = StudioError::Send {
                reason: "request cancelled before the agent replied".to_string(),
            };
            tracing::warn!(error = %error, "message exchange dropped");
            self.conversation.push(Turn::error(&error));
            self.conversation.available_tasks();
        }
    }
}

/// One session and its conversation.
pub struct Studio {
    session: SessionManager,
    conversation: Conversation,
    busy: bool,
}

impl Studio {
    pub fn new(connector: Arc<dyn AgentConnector>) -> Self {
        Self {
            session: SessionManager::new(connector),
            conversation: Conversation::new(),
            busy: false,
        }
    }

    /// Connect to a new agent; a successful connect starts a fresh conversation.
    pub async fn connect(&mut self, url: &str) -> StudioResult<SessionInfo> {
        let info = self.session.connect(url).await?;
        self.conversation.clear();
        Ok(info)
    }

    pub fn disconnect(&mut self) {
        self.session.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn current_agent(&self) -> Option<&SessionInfo> {
        self.session.current_agent()
    }

    pub fn agent_card_json(&self) -> Option<String> {
        self.session.agent_card_json()
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// True while a send is awaiting the agent.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn turns(&self) -> &[Turn] {
        self.conversation.turns()
    }

    pub fn available_tasks(&mut self) -> Vec<AvailableTask> {
        self.conversation.available_tasks()
    }

    pub fn selected_task(&self) -> Option<&str> {
        self.conversation.selected_task()
    }

    pub fn select_task(&mut self, task_id: &str) -> StudioResult<()> {
        self.conversation.select_task(task_id)
    }

    pub fn task_turns(&self, task_id: &str) -> Vec<&Turn> {
        self.conversation.task_turns(task_id)
    }

    /// Send one user message and append the user and agent turns.
    ///
    /// Precondition failures append nothing. A failed exchange is recorded as
    /// an error turn and also returned.
    pub async fn send(&mut self, text: &str) -> StudioResult<&Turn> {
        if !self.session.is_connected() {
            return Err(StudioError::NotConnected);
        }
        if text.trim().is_empty() {
            return Err(StudioError::EmptyMessage);
        }

        self.conversation.available_tasks();
        let target = self.conversation.selected_task().map(str::to_string);
        let user_link = target.as_ref().map(|task_id| TaskLink {
            task_id: task_id.clone(),
            status: TaskStatus::in_progress(),
        });
        self.conversation.push(Turn::user(text, user_link));

        let prior = self.conversation.prior_agent_texts();

        let result = {
            let in_flight = InFlight::start(&mut self.busy, &mut self.conversation);
            let result =
                exchange::send_message(&self.session, text, target.as_deref(), &prior).await;
            in_flight.finish();
            result
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "message exchange failed");
                self.conversation.push(Turn::error(&e));
                self.conversation.available_tasks();
                return Err(e);
            }
        };

        let turn = self.agent_turn(outcome, target.as_deref());
        self.conversation.push(turn);
        self.conversation.available_tasks();

        self.conversation
            .turns()
            .last()
            .ok_or_else(|| StudioError::UnexpectedReply {
                reason: "reply was not recorded".to_string(),
            })
    }

    fn agent_turn(&mut self, outcome: ExchangeOutcome, target: Option<&str>) -> Turn {
        let ExchangeOutcome {
            text,
            parts,
            task_id,
            status,
            ..
        } = outcome;

        let task_id = match (task_id, target) {
            (Some(revealed), None) => {
                self.conversation.link_last_user_turn(&revealed);
                Some(revealed)
            }
            (Some(revealed), Some(_)) => Some(revealed),
            (None, target) => target.map(str::to_string),
        };

        let link = task_id.map(|task_id| TaskLink {
            task_id,
            status: status.unwrap_or_else(|| detect_status_from_text(&text)),
        });
        Turn::agent(text, link, parts)
    }
}
