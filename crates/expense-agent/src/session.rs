use expense_agent_core::{AgentSession, AgentSessionBuilder};
use expense_agent_model::ModelProvider;

use crate::tools::SendEmailTool;
use crate::{Console, RemoteAgentError};

/// Instructions given to the model for every session.
pub const INSTRUCTIONS: &str = include_str!("./instructions.md");

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentSessionBuilder,
    console: Console,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let instructions = INSTRUCTIONS.split_whitespace().collect::<Vec<_>>().join(" ");
        let agent_builder = AgentSessionBuilder::with_model_provider(provider)
            .with_instructions(instructions);
        Self {
            agent_builder,
            console: Console::stdout(),
        }
    }

    /// Sets the console the tools print to, defaults to the standard
    /// output.
    #[inline]
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Builds a new session.
    pub fn build(self) -> Session {
        let agent = self
            .agent_builder
            .with_tool(SendEmailTool::new(self.console))
            .build();

        Session { agent }
    }
}

/// An expense claim session, a wrapper around [`AgentSession`] with the
/// expense instructions and tools in place.
pub struct Session {
    agent: AgentSession,
}

impl Session {
    /// Sends the message and returns the final answer of the agent.
    #[inline]
    pub async fn submit(&self, message: String) -> Result<String, RemoteAgentError> {
        self.agent.run([message]).await.map_err(RemoteAgentError::from)
    }
}
