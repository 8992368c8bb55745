//! Constants for the A2A client

/// Well-known path of the agent card
pub const AGENT_CARD_PATH: &str = ".well-known/agent-card.json";

/// JSON-RPC version
pub const JSONRPC_VERSION: &str = "2.0";

pub const METHOD_MESSAGE_SEND: &str = "message/send";
pub const METHOD_TASKS_GET: &str = "tasks/get";
pub const METHOD_TASKS_CANCEL: &str = "tasks/cancel";
