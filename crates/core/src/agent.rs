mod builder;
mod error;

use expense_agent_model::ModelTool;

use crate::conversation::Conversation;
use crate::model_client::ModelClient;
use crate::tool::Executor as ToolExecutor;
pub use builder::AgentSessionBuilder;
pub use error::Error;

/// The number of consecutive tool rounds allowed in one run by default.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

/// A conversational context bound to one model provider, one set of
/// instructions and the registered tools.
///
/// The session owns the provider. Everything the provider acquired, like
/// credentials, is released when the session is dropped.
pub struct AgentSession {
    model_client: ModelClient,
    tool_executor: ToolExecutor,
    tool_definitions: Vec<ModelTool>,
    instructions: Option<String>,
    max_tool_rounds: usize,
}

impl AgentSession {
    fn from_builder(builder: AgentSessionBuilder) -> Self {
        let AgentSessionBuilder {
            model_client,
            instructions,
            tools,
            max_tool_rounds,
        } = builder;

        let tool_executor = ToolExecutor::with_tools(tools);
        let tool_definitions = tool_executor.definitions();
        debug!("session opened with {} tools", tool_definitions.len());
        Self {
            model_client,
            tool_executor,
            tool_definitions,
            instructions,
            max_tool_rounds,
        }
    }

    /// Sends the messages as consecutive user turns and returns the final
    /// text of the model.
    ///
    /// Tool calls requested along the way are executed and their results
    /// sent back, until the model answers without calling any tool.
    pub async fn run<I, S>(&self, messages: I) -> Result<String, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut conversation =
            Conversation::with_instructions(self.instructions.as_deref());
        for msg in messages {
            conversation.push_user(msg.into());
        }

        let mut rounds = 0;
        loop {
            let request = conversation.to_request(&self.tool_definitions);
            let resp = self
                .model_client
                .send_request(request)
                .await
                .map_err(Error::Model)?;
            debug!(
                "model finished ({:?}) with {} tool calls",
                resp.finish_reason,
                resp.tool_calls.len()
            );

            if resp.tool_calls.is_empty() {
                return Ok(resp.content);
            }

            rounds += 1;
            if rounds > self.max_tool_rounds {
                return Err(Error::ToolRoundsExceeded(self.max_tool_rounds));
            }

            conversation.push_assistant(resp.content, resp.tool_calls.clone());
            let results = self.tool_executor.execute(resp.tool_calls).await;
            for result in results {
                conversation.push_tool_result(result);
            }
        }
    }
}

impl Drop for AgentSession {
    fn drop(&mut self) {
        debug!("session closed");
    }
}
