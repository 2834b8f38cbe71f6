//! Core logic of the agent session: conversation, model client, tool
//! execution and the tool-calling loop.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod conversation;
mod model_client;
pub mod tool;

pub use agent::{AgentSession, AgentSessionBuilder, DEFAULT_MAX_TOOL_ROUNDS, Error};
