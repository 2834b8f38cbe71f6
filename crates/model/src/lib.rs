//! A provider-neutral protocol for talking to hosted LLMs.
//!
//! This crate establishes the request, response and error shapes that the
//! agent session relies on, so that the session never needs to know which
//! vendor serves the model on the other end.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to. The only exception
//! is [`ToolSchema`], which knows how to render itself as a JSON schema.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;
mod schema;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
pub use schema::*;
