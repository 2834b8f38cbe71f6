use expense_agent_model::ModelProvider;

use super::{AgentSession, DEFAULT_MAX_TOOL_ROUNDS};
use crate::model_client::ModelClient;
use crate::tool::{AnyTool, Tool, ToolObject};

/// [`AgentSession`] builder.
pub struct AgentSessionBuilder {
    pub(crate) model_client: ModelClient,
    pub(crate) instructions: Option<String>,
    pub(crate) tools: Vec<Box<dyn ToolObject>>,
    pub(crate) max_tool_rounds: usize,
}

impl AgentSessionBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            instructions: None,
            tools: vec![],
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Sets the system instructions sent at the start of every run.
    #[inline]
    pub fn with_instructions<S: Into<String>>(mut self, instructions: S) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.tools.push(Box::new(AnyTool(tool)));
        self
    }

    /// Limits how many consecutive tool rounds one run may take.
    #[inline]
    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    /// Builds the session.
    #[inline]
    pub fn build(self) -> AgentSession {
        AgentSession::from_builder(self)
    }
}
