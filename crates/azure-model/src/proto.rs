use expense_agent_model::{
    AssistantMessage, ModelMessage, ModelRequest, ModelTool, ToolCallRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FunctionDelta {
    pub name: Option<String>,
    pub arguments: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ToolCallDelta {
    pub index: Option<u32>,
    pub id: Option<String>,
    pub function: Option<FunctionDelta>,
}

/// One streamed chunk.
///
/// Azure sends chunks with empty `id` and `choices` to deliver prompt
/// filter results and usage, so both default to empty.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub delta: Option<Delta>,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Delta {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct Tool {
    r#type: &'static str,
    function: FunctionTool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FunctionCall {
    name: String,
    arguments: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToolCall {
    id: String,
    r#type: &'static str,
    function: FunctionCall,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

/// Request body for the deployment-scoped chat completions route. The
/// deployment is part of the URL, so there's no `model` field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatCompletionRequest {
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    stream: bool,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(req: &ModelRequest) -> ChatCompletionRequest {
    ChatCompletionRequest {
        messages: req.messages.iter().map(create_message).collect(),
        tools: req.tools.iter().map(create_tool).collect(),
        stream: true,
    }
}

#[inline]
fn create_message(msg: &ModelMessage) -> Message {
    match msg {
        ModelMessage::System(content) => Message::System {
            content: content.clone(),
        },
        ModelMessage::User(content) => Message::User {
            content: content.clone(),
        },
        ModelMessage::Assistant(AssistantMessage {
            content,
            tool_calls,
        }) => Message::Assistant {
            // Turns that only carry tool calls send a `null` content.
            content: if content.is_empty() && !tool_calls.is_empty() {
                None
            } else {
                Some(content.clone())
            },
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls.iter().map(create_tool_call).collect())
            },
        },
        ModelMessage::Tool(result) => Message::Tool {
            tool_call_id: result.id.clone(),
            content: result.content.clone(),
        },
    }
}

#[inline]
fn create_tool_call(req: &ToolCallRequest) -> ToolCall {
    let arguments = match &req.arguments {
        // Arguments that failed to parse are kept as the raw string.
        Value::String(raw) => raw.clone(),
        value => value.to_string(),
    };
    ToolCall {
        id: req.id.clone(),
        r#type: "function",
        function: FunctionCall {
            name: req.name.clone(),
            arguments,
        },
    }
}

#[inline]
fn create_tool(tool: &ModelTool) -> Tool {
    Tool {
        r#type: "function",
        function: FunctionTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use expense_agent_model::ToolCallResult;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_create_request() {
        let request = ModelRequest {
            messages: vec![
                ModelMessage::System("You file expense claims.".to_owned()),
                ModelMessage::User("Submit: Taxi $20".to_owned()),
                ModelMessage::Assistant(AssistantMessage {
                    content: String::new(),
                    tool_calls: vec![ToolCallRequest {
                        id: "call_1".to_owned(),
                        name: "send_email".to_owned(),
                        arguments: json!({ "to": "expenses@contoso.com" }),
                    }],
                }),
                ModelMessage::Tool(ToolCallResult {
                    id: "call_1".to_owned(),
                    content: "null".to_owned(),
                }),
            ],
            tools: vec![ModelTool {
                name: "send_email".to_owned(),
                description: "Sends an email.".to_owned(),
                parameters: json!({ "type": "object" }),
            }],
        };

        let body = serde_json::to_value(create_request(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "messages": [
                    { "role": "system", "content": "You file expense claims." },
                    { "role": "user", "content": "Submit: Taxi $20" },
                    {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {
                                "name": "send_email",
                                "arguments": r#"{"to":"expenses@contoso.com"}"#,
                            },
                        }],
                    },
                    { "role": "tool", "tool_call_id": "call_1", "content": "null" },
                ],
                "tools": [{
                    "type": "function",
                    "function": {
                        "name": "send_email",
                        "description": "Sends an email.",
                        "parameters": { "type": "object" },
                    },
                }],
                "stream": true,
            })
        );
    }

    #[test]
    fn test_tools_omitted_when_empty() {
        let request = ModelRequest {
            messages: vec![ModelMessage::assistant_text("Done.")],
            tools: vec![],
        };
        let body = serde_json::to_value(create_request(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "messages": [{ "role": "assistant", "content": "Done." }],
                "stream": true,
            })
        );
    }

    #[test]
    fn test_parse_filter_chunk() {
        let chunk: ChatCompletionChunk = serde_json::from_str(
            r#"{"choices":[],"created":0,"id":"","model":"","object":"","prompt_filter_results":[{"prompt_index":0,"content_filter_results":{}}]}"#,
        )
        .unwrap();
        assert!(chunk.id.is_empty());
        assert!(chunk.choices.is_empty());
    }
}
