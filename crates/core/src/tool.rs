//! Tool call supports.

mod error;
mod executor;

use std::pin::Pin;

use expense_agent_model::{ModelTool, ToolSchema};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::{Error, ErrorKind};
pub(crate) use executor::Executor;

/// The result of a tool call, as reported back to the model.
pub type ToolResult = Result<String, Error>;

/// A tool that can be called by the model.
///
/// What the model sees of the tool is the statically declared
/// [`ToolSchema`]. The implementation only needs to deserialize its
/// `Input` from the arguments the model produced.
///
/// Implementations of this trait should be stateless. The tool can still be
/// context-aware, for example by holding a handle to an output sink, as an
/// immutable state set during initialization and copied when executing.
pub trait Tool: Send + Sync + 'static {
    /// The type of input that the tool accepts.
    type Input: DeserializeOwned;

    /// The type of output that the tool produces. It is serialized as JSON
    /// for the model, so `()` reads as `null`.
    type Output: Serialize;

    /// Returns the schema that describes the tool to the model.
    fn schema(&self) -> &ToolSchema;

    /// Executes the tool with the given input.
    ///
    /// This method must return a future that is fully independent of `self`.
    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = Result<Self::Output, Error>> + Send + 'static;
}

pub(crate) trait ToolObject: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn definition(&self) -> ModelTool;

    fn execute(
        &self,
        arguments: Value,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send>>;
}

pub(crate) struct AnyTool<T: Tool>(pub T);

impl<T: Tool> ToolObject for AnyTool<T> {
    #[inline]
    fn name(&self) -> &str {
        &self.0.schema().name
    }

    #[inline]
    fn definition(&self) -> ModelTool {
        self.0.schema().to_model_tool()
    }

    #[inline]
    fn execute(
        &self,
        arguments: Value,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send>> {
        let input: T::Input = match serde_json::from_value(arguments) {
            Ok(input) => input,
            Err(err) => {
                let reason = format!("{err}");
                return Box::pin(std::future::ready(ToolResult::Err(
                    Error::invalid_input().with_reason(reason),
                )));
            }
        };
        let fut = self.0.execute(input);
        Box::pin(async move {
            let output = fut.await?;
            serde_json::to_string(&output).map_err(|err| {
                Error::execution_error().with_reason(format!("{err}"))
            })
        })
    }
}
