use expense_agent_model::ToolCallRequest;
use serde::{Deserialize, Serialize};

/// The events in a preset response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetEvent {
    #[serde(rename = "message_delta")]
    MessageDelta(String),
    #[serde(rename = "tool_call")]
    ToolCall(ToolCallRequest),
}

/// The preset response for one request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Events in this response. The completion event is appended
    /// automatically.
    pub events: Vec<PresetEvent>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified events.
    #[inline]
    pub fn with_events(events: impl Into<Vec<PresetEvent>>) -> Self {
        Self {
            events: events.into(),
        }
    }

    /// Creates a `PresetResponse` that answers with a single text delta.
    #[inline]
    pub fn with_text<S: Into<String>>(text: S) -> Self {
        Self::with_events([PresetEvent::MessageDelta(text.into())])
    }

    #[inline]
    pub(crate) fn has_tool_call(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, PresetEvent::ToolCall(_)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let response = PresetResponse::with_events([
            PresetEvent::MessageDelta("Submitting your claim.".to_string()),
            PresetEvent::ToolCall(ToolCallRequest {
                id: "1".to_string(),
                name: "send_email".to_string(),
                arguments: json!({
                    "to": "expenses@contoso.com",
                    "subject": "Expense Claim",
                    "body": "Taxi: $20"
                }),
            }),
        ]);

        let serialized = serde_json::to_string(&response).unwrap();
        assert!(serialized.contains(r#""type":"tool_call""#));
        let deserialized: PresetResponse =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(response, deserialized);
        assert!(deserialized.has_tool_call());
    }
}
