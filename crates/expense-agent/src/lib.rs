//! An agent that turns a local expenses file into an expense claim.
//!
//! The crate reads the expenses, asks the user what to do with them, and
//! lets a hosted model decide whether to call the `send_email` tool. The
//! CLI is the main entry, but the pieces work as a library too.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod config;
mod console;
mod error;
pub mod loader;
mod orchestrator;
pub mod prompt;
mod session;
pub mod tools;

pub use config::Config;
pub use console::{CapturedOutput, Console};
pub use error::{Error, RemoteAgentError};
pub use orchestrator::{
    AzureConnector, Connector, Orchestrator, Outcome, Stage, compose_message,
};
pub use session::{INSTRUCTIONS, Session, SessionBuilder};
