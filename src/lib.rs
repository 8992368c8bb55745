//! # A2A Studio
//!
//! A client studio for A2A agents. It connects to an agent from its published
//! card, validates the card, exchanges messages and keeps a conversation log in
//! which replies are normalized, deduplicated and linked to the tasks the agent
//! creates.
//!
//! ```no_run
//! use a2a_studio::{Studio, StudioConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connector = StudioConfig::default().connector()?;
//! let mut studio = Studio::new(Arc::new(connector));
//!
//! let info = studio.connect("http://localhost:5000").await?;
//! for warning in &info.validation.warnings {
//!     println!("warning: {warning}");
//! }
//!
//! let reply = studio.send("TASK: draw me a chart").await?;
//! println!("{} ({:?})", reply.text, reply.task);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod conversation;
pub mod dedup;
pub mod errors;
pub mod exchange;
pub mod logging;
pub mod parts;
pub mod session;
pub mod tasks;
pub mod transport;
pub mod validation;

pub use config::{EnvKey, StudioConfig};
pub use conversation::{Conversation, Studio, TaskLink, Turn, TurnOrigin};
pub use errors::{ErrorKind, StudioError, StudioResult};
pub use exchange::{ExchangeOutcome, ReplyKind, EMPTY_REPLY_TEXT};
pub use parts::{ConversationPart, FileSource, PartKind};
pub use session::{SessionInfo, SessionManager, SkillSummary};
pub use tasks::{AvailableTask, TaskStatus, TaskTracker};
pub use transport::{AgentConnector, AgentReply, AgentTransport, HttpConnector};
pub use validation::{validate, validate_agent_card, ValidationOutcome};

// Re-export the protocol crates for callers implementing the seams.
pub use a2a_client;
pub use a2a_types;
