//! A sample A2A agent for exercising clients.
//!
//! The agent answers `message/send`, `tasks/get` and `tasks/cancel` on a single
//! JSON-RPC endpoint and publishes its card at the well-known path.
//!
//! ```no_run
//! # async fn example() -> std::io::Result<()> {
//! let addr = echo_agent::spawn("127.0.0.1:0").await?;
//! println!("echo agent at http://{addr}/");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod error;
pub mod json_rpc;
pub mod routes;
pub mod server;

pub use agent::{default_card, EchoAgent, TARGET_STATE_METADATA_KEY};
pub use error::{Error, Result};
pub use server::{router, serve, spawn};
