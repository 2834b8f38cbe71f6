//! Conversation-related types.

use expense_agent_model::{
    AssistantMessage, ModelMessage, ModelRequest, ModelTool, ToolCallRequest,
    ToolCallResult,
};

/// The message history of one request/response cycle.
///
/// A conversation always starts with the system instructions, if there are
/// any, and only grows afterwards.
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    pub(crate) messages: Vec<ModelMessage>,
}

impl Conversation {
    /// Creates a conversation that starts with the given instructions.
    #[inline]
    pub fn with_instructions(instructions: Option<&str>) -> Self {
        let messages = instructions
            .map(|s| vec![ModelMessage::System(s.to_owned())])
            .unwrap_or_default();
        Self { messages }
    }

    /// Returns the messages in order.
    #[inline]
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    #[inline]
    pub(crate) fn push_user(&mut self, text: String) {
        self.messages.push(ModelMessage::User(text));
    }

    #[inline]
    pub(crate) fn push_assistant(
        &mut self,
        content: String,
        tool_calls: Vec<ToolCallRequest>,
    ) {
        self.messages.push(ModelMessage::Assistant(AssistantMessage {
            content,
            tool_calls,
        }));
    }

    #[inline]
    pub(crate) fn push_tool_result(&mut self, result: ToolCallResult) {
        self.messages.push(ModelMessage::Tool(result));
    }

    #[inline]
    pub(crate) fn to_request(&self, tools: &[ModelTool]) -> ModelRequest {
        ModelRequest {
            messages: self.messages.clone(),
            tools: tools.to_vec(),
        }
    }
}
