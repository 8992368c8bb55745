//! # A2A (Agent2Agent) Protocol Types
//!
//! This crate provides the Rust data structures for the Agent2Agent (A2A) protocol
//! needed by a client: the discovery card, messages and their parts, tasks with
//! their artifacts, and the JSON-RPC 2.0 envelope they travel in. The types are
//! designed for serialization and deserialization with `serde`.
//!
//! Deserialization is deliberately forgiving at the edges the protocol leaves
//! open for extension: unknown part kinds become [`Part::Unknown`] and unknown
//! task states are kept verbatim in [`TaskState::Other`].

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

pub mod agent_card;
pub use agent_card::{AgentCapabilities, AgentCard, AgentProvider, AgentSkill};

pub const PROTOCOL_VERSION: &str = "0.3.0";
pub const TASK_KIND: &str = "task";
pub const MESSAGE_KIND: &str = "message";

// ============================================================================
// JSON-RPC 2.0 Base Types
// ============================================================================

/// Represents a JSON-RPC 2.0 identifier, which can be a string, number, or null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum JSONRPCId {
    String(String),
    Integer(i64),
    Null,
}

/// Represents a JSON-RPC 2.0 Error object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JSONRPCError {
    /// A number that indicates the error type that occurred.
    pub code: i32,
    /// A string providing a short description of the error.
    pub message: String,
    /// A primitive or structured value containing additional information about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Represents a JSON-RPC 2.0 Error Response object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JSONRPCErrorResponse {
    pub jsonrpc: String,
    pub id: Option<JSONRPCId>,
    pub error: JSONRPCError,
}

pub const JSON_PARSE_ERROR_CODE: i32 = -32700;
pub const INVALID_REQUEST_ERROR_CODE: i32 = -32600;
pub const METHOD_NOT_FOUND_ERROR_CODE: i32 = -32601;
pub const INVALID_PARAMS_ERROR_CODE: i32 = -32602;
pub const INTERNAL_ERROR_CODE: i32 = -32603;
pub const TASK_NOT_FOUND_ERROR_CODE: i32 = -32001;
pub const TASK_NOT_CANCELABLE_ERROR_CODE: i32 = -32002;

// ============================================================================
// A2A Core Protocol Types
// ============================================================================

/// Defines the lifecycle states of a Task.
///
/// Serialized as the kebab-case protocol string. Strings outside the known set
/// are preserved in [`TaskState::Other`] rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum TaskState {
    /// The task has been submitted and is awaiting execution.
    Submitted,
    /// The agent is actively working on the task.
    Working,
    /// The task is paused and waiting for input from the user.
    InputRequired,
    /// The task has been successfully completed.
    Completed,
    /// The task has been canceled by the user.
    Canceled,
    /// The task failed due to an error during execution.
    Failed,
    /// The task was rejected by the agent and was not started.
    Rejected,
    /// The task requires authentication to proceed.
    AuthRequired,
    /// The task is in an unknown or indeterminate state.
    #[default]
    Unknown,
    /// A state string this crate does not know about.
    Other(String),
}

impl TaskState {
    /// The protocol string for this state.
    pub fn as_str(&self) -> &str {
        match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::InputRequired => "input-required",
            TaskState::Completed => "completed",
            TaskState::Canceled => "canceled",
            TaskState::Failed => "failed",
            TaskState::Rejected => "rejected",
            TaskState::AuthRequired => "auth-required",
            TaskState::Unknown => "unknown",
            TaskState::Other(raw) => raw,
        }
    }

    /// States after which the task accepts no further work.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Canceled | TaskState::Failed | TaskState::Rejected
        )
    }
}

impl From<String> for TaskState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "submitted" => TaskState::Submitted,
            "working" => TaskState::Working,
            "input-required" => TaskState::InputRequired,
            "completed" => TaskState::Completed,
            "canceled" => TaskState::Canceled,
            "failed" => TaskState::Failed,
            "rejected" => TaskState::Rejected,
            "auth-required" => TaskState::AuthRequired,
            "unknown" => TaskState::Unknown,
            _ => TaskState::Other(raw),
        }
    }
}

impl From<&str> for TaskState {
    fn from(raw: &str) -> Self {
        TaskState::from(raw.to_string())
    }
}

impl From<TaskState> for String {
    fn from(state: TaskState) -> Self {
        match state {
            TaskState::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Represents the status of a task at a specific point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TaskStatus {
    /// The current state of the task's lifecycle.
    #[serde(default)]
    pub state: TaskState,
    /// An ISO 8601 datetime string indicating when this status was recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// An optional, human-readable message providing more details about the current status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

/// Represents a single, stateful operation or conversation between a client and an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// The type of this object, used as a discriminator. Always 'task'.
    #[serde(default = "default_task_kind")]
    pub kind: String,
    /// A unique identifier for the task, generated by the server. May be empty on malformed replies.
    #[serde(default)]
    pub id: String,
    /// A server-generated identifier for maintaining context across multiple related tasks or interactions.
    #[serde(rename = "contextId", default)]
    pub context_id: String,
    /// The current status of the task, including its state and a descriptive message.
    #[serde(default)]
    pub status: TaskStatus,
    /// An array of messages exchanged during the task, representing the conversation history.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub history: Vec<Message>,
    /// A collection of artifacts generated by the agent during the execution of the task.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub artifacts: Vec<Artifact>,
    /// Optional metadata for extensions. The key is an extension-specific identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

fn default_task_kind() -> String {
    TASK_KIND.to_string()
}

/// Identifies the sender of a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// For messages sent by the client/user.
    User,
    /// For messages sent by the agent/service.
    Agent,
}

/// Represents a single message in the conversation between a user and an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// The type of this object, used as a discriminator. Always 'message'.
    #[serde(default = "default_message_kind")]
    pub kind: String,
    /// A unique identifier for the message, typically a UUID, generated by the sender.
    #[serde(rename = "messageId", default)]
    pub message_id: String,
    /// Identifies the sender of the message. `user` for the client, `agent` for the service.
    pub role: MessageRole,
    /// An array of content parts that form the message body.
    #[serde(default)]
    pub parts: Vec<Part>,
    /// The context identifier for this message, used to group related interactions.
    #[serde(skip_serializing_if = "Option::is_none", rename = "contextId")]
    pub context_id: Option<String>,
    /// The identifier of the task this message is part of. Omitted for the first message of a new task.
    #[serde(skip_serializing_if = "Option::is_none", rename = "taskId")]
    pub task_id: Option<String>,
    /// A list of other task IDs that this message references for additional context.
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        rename = "referenceTaskIds",
        default
    )]
    pub reference_task_ids: Vec<String>,
    /// Optional metadata for extensions. The key is an extension-specific identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

fn default_message_kind() -> String {
    MESSAGE_KIND.to_string()
}

impl Message {
    /// A message with a single text part.
    pub fn text(role: MessageRole, message_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: default_message_kind(),
            message_id: message_id.into(),
            role,
            parts: vec![Part::text(text)],
            context_id: None,
            task_id: None,
            reference_task_ids: Vec::new(),
            metadata: None,
        }
    }

    /// Concatenation of every text part, separated by newlines.
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(Part::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A discriminated union representing a part of a message or artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    /// Represents a text segment.
    Text {
        /// The string content of the text part.
        text: String,
        /// Optional metadata associated with this part.
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<HashMap<String, serde_json::Value>>,
    },
    /// Represents a file segment.
    File {
        /// The file content, represented as either a URI or as base64-encoded bytes.
        file: FileContent,
        /// Optional metadata associated with this part.
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<HashMap<String, serde_json::Value>>,
    },
    /// Represents a structured data segment (e.g., JSON).
    Data {
        /// The structured data content.
        data: serde_json::Value,
        /// Optional metadata associated with this part.
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<HashMap<String, serde_json::Value>>,
    },
    /// A part kind introduced by a newer protocol revision.
    #[serde(other)]
    Unknown,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            metadata: None,
        }
    }

    pub fn data(data: serde_json::Value) -> Self {
        Part::Data {
            data,
            metadata: None,
        }
    }

    pub fn file(file: FileContent) -> Self {
        Part::File {
            file,
            metadata: None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            Part::Data { data, .. } => Some(data),
            _ => None,
        }
    }
}

/// Represents file content, which can be provided either directly as bytes or as a URI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FileContent {
    WithBytes(FileWithBytes),
    WithUri(FileWithUri),
}

/// Represents a file with its content provided directly as a base64-encoded string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileWithBytes {
    /// The base64-encoded content of the file.
    pub bytes: String,
    /// The MIME type of the file (e.g., "application/pdf").
    #[serde(skip_serializing_if = "Option::is_none", rename = "mimeType")]
    pub mime_type: Option<String>,
    /// An optional name for the file (e.g., "document.pdf").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Represents a file with its content located at a specific URI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileWithUri {
    /// A URL pointing to the file's content.
    pub uri: String,
    /// The MIME type of the file (e.g., "application/pdf").
    #[serde(skip_serializing_if = "Option::is_none", rename = "mimeType")]
    pub mime_type: Option<String>,
    /// An optional name for the file (e.g., "document.pdf").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Represents a file, data structure, or other resource generated by an agent during a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artifact {
    /// A unique identifier for the artifact within the scope of the task.
    #[serde(rename = "artifactId", default)]
    pub artifact_id: String,
    /// An array of content parts that make up the artifact.
    #[serde(default)]
    pub parts: Vec<Part>,
    /// An optional, human-readable name for the artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// An optional, human-readable description of the artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ============================================================================
// A2A Method Parameter Types
// ============================================================================

/// Defines the parameters for a request to send a message to an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageSendParams {
    /// The message object being sent to the agent.
    pub message: Message,
    /// Optional configuration for the send request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<MessageSendConfiguration>,
    /// Optional metadata for extensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// Defines configuration options for a `message/send` request.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MessageSendConfiguration {
    /// If true, the client will wait for the task to complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking: Option<bool>,
    /// The number of most recent messages from the task's history to retrieve in the response.
    #[serde(skip_serializing_if = "Option::is_none", rename = "historyLength")]
    pub history_length: Option<i32>,
    /// A list of output MIME types the client is prepared to accept in the response.
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        rename = "acceptedOutputModes",
        default
    )]
    pub accepted_output_modes: Vec<String>,
}

/// Defines parameters containing a task ID, used for `tasks/cancel`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskIdParams {
    /// The unique identifier of the task.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// Defines parameters for querying a task, used for `tasks/get`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskQueryParams {
    /// The unique identifier of the task.
    pub id: String,
    /// The number of most recent messages from the task's history to retrieve.
    #[serde(skip_serializing_if = "Option::is_none", rename = "historyLength")]
    pub history_length: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

// ============================================================================
// A2A Response Types
// ============================================================================

/// The result of a `message/send` call, which can be a direct reply or a task object.
///
/// The `kind` discriminator decides the variant. Replies from agents that omit
/// it are classified by shape: a `status` field means a task, `role` plus
/// `parts` means a message.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SendMessageResult {
    Task(Task),
    Message(Message),
}

impl<'de> Deserialize<'de> for SendMessageResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = value.get("kind").and_then(serde_json::Value::as_str);
        let is_task = match kind {
            Some(TASK_KIND) => true,
            Some(MESSAGE_KIND) => false,
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "unexpected result kind '{other}'"
                )))
            }
            None if value.get("status").is_some() => true,
            None if value.get("role").is_some() && value.get("parts").is_some() => false,
            None => {
                return Err(D::Error::custom(
                    "result is neither a task nor a message",
                ))
            }
        };

        if is_task {
            serde_json::from_value(value)
                .map(SendMessageResult::Task)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(SendMessageResult::Message)
                .map_err(D::Error::custom)
        }
    }
}
