use std::collections::HashMap;

use expense_agent_model::{ModelTool, ToolCallRequest, ToolCallResult};
use tracing::Instrument;

use crate::tool::ToolObject;

/// An executor that handles tool call requests from the model.
///
/// Requests are executed one after another in the order the model produced
/// them, and every request yields exactly one result.
#[derive(Default)]
pub struct Executor {
    tools: HashMap<String, Box<dyn ToolObject>>,
    // Registration order, so definitions are sent in a stable order.
    order: Vec<String>,
}

impl Executor {
    pub fn with_tools(tools: Vec<Box<dyn ToolObject>>) -> Self {
        let mut executor = Self::default();
        for tool in tools {
            let name = tool.name().to_owned();
            if executor.tools.insert(name.clone(), tool).is_some() {
                warn!("tool registered twice, keeping the last: {name}");
                continue;
            }
            executor.order.push(name);
        }
        executor
    }

    #[inline]
    pub fn definitions(&self) -> Vec<ModelTool> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    pub async fn execute(
        &self,
        requests: Vec<ToolCallRequest>,
    ) -> Vec<ToolCallResult> {
        let mut results = Vec::with_capacity(requests.len());
        for req in requests {
            let ToolCallRequest {
                id,
                name,
                arguments,
            } = req;
            let Some(tool) = self.tools.get(&name) else {
                warn!("tool not found: {name}");
                results.push(ToolCallResult {
                    id,
                    content: format!("Error: tool not found: {name}"),
                });
                continue;
            };

            trace!("running a tool ({id}) with args: {arguments:?}");
            let content = match tool
                .execute(arguments)
                .instrument(debug_span!("tool executor", tool = %name))
                .await
            {
                Ok(output) => output,
                Err(err) => {
                    warn!("tool {name} failed: {err}");
                    format!("Error: {}", err.reason())
                }
            };
            results.push(ToolCallResult { id, content });
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use expense_agent_model::ToolSchema;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::tool::{AnyTool, Error, Tool};

    #[derive(Deserialize)]
    struct EchoInput {
        text: String,
    }

    struct EchoTool {
        schema: ToolSchema,
    }

    impl EchoTool {
        fn new(name: &str) -> Self {
            Self {
                schema: ToolSchema::new(name, "Echoes the text."),
            }
        }
    }

    impl Tool for EchoTool {
        type Input = EchoInput;
        type Output = String;

        fn schema(&self) -> &ToolSchema {
            &self.schema
        }

        fn execute(
            &self,
            input: Self::Input,
        ) -> impl Future<Output = Result<String, Error>> + Send + 'static
        {
            let result = if input.text.is_empty() {
                Err(Error::execution_error().with_reason("nothing to echo"))
            } else {
                Ok(input.text)
            };
            ready(result)
        }
    }

    fn request(id: &str, name: &str, arguments: serde_json::Value) -> ToolCallRequest {
        ToolCallRequest {
            id: id.to_owned(),
            name: name.to_owned(),
            arguments,
        }
    }

    #[tokio::test]
    async fn test_execute_in_order() {
        let executor = Executor::with_tools(vec![
            Box::new(AnyTool(EchoTool::new("echo"))),
            Box::new(AnyTool(EchoTool::new("shout"))),
        ]);
        let names: Vec<_> =
            executor.definitions().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["echo", "shout"]);

        let results = executor
            .execute(vec![
                request("tool:1", "echo", json!({ "text": "one" })),
                request("tool:2", "missing", json!({})),
                request("tool:3", "echo", json!({ "text": 3 })),
                request("tool:4", "shout", json!({ "text": "" })),
            ])
            .await;

        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["tool:1", "tool:2", "tool:3", "tool:4"]);
        // Outputs are JSON encoded.
        assert_eq!(results[0].content, r#""one""#);
        assert_eq!(results[1].content, "Error: tool not found: missing");
        assert!(results[2].content.starts_with("Error: invalid type"));
        assert_eq!(results[3].content, "Error: nothing to echo");
    }
}
