//! # A2A Protocol Client
//!
//! This crate provides a client for calling remote A2A (Agent-to-Agent) protocol compliant agents
//! over HTTP/HTTPS using JSON-RPC 2.0.
//!
//! ## Features
//!
//! - Agent discovery via agent cards
//! - `message/send`, `tasks/get` and `tasks/cancel`
//! - Authentication support (Bearer tokens, custom headers)
//! - W3C trace context propagation from the current `tracing` span
//!
//! ## Example
//!
//! ```rust,no_run
//! use a2a_client::A2AClient;
//! use a2a_types::{Message, MessageRole, MessageSendParams, SendMessageResult};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = A2AClient::from_card_url("https://agent.example.com")
//!     .await?
//!     .with_auth_token("your_api_key");
//!
//! let params = MessageSendParams {
//!     message: Message::text(MessageRole::User, "msg_123", "Hello!"),
//!     configuration: None,
//!     metadata: None,
//! };
//!
//! match client.send_message(params).await? {
//!     SendMessageResult::Message(reply) => println!("{}", reply.text_content()),
//!     SendMessageResult::Task(task) => println!("task {} is {:?}", task.id, task.status.state),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod constants;
pub mod error;

pub use client::{agent_card_url, header_map, A2AClient};
pub use error::{A2AError, A2AResult};
