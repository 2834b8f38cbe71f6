use std::future::ready;

use expense_agent_core::tool::{Error as ToolError, Tool};
use expense_agent_model::{ParameterType, ToolParameter, ToolSchema};
use serde::Deserialize;

use crate::Console;

/// Arguments of the `send_email` tool.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[cfg_attr(test, derive(schemars::JsonSchema))]
pub struct SendEmailParameters {
    /// The recipient address.
    #[cfg_attr(test, schemars(description = "Who to send the email to"))]
    pub to: String,
    /// The subject line.
    #[cfg_attr(test, schemars(description = "The subject of the email."))]
    pub subject: String,
    /// The plain text body.
    #[cfg_attr(test, schemars(description = "The text body of the email."))]
    pub body: String,
}

/// Renders an email the way [`SendEmailTool`] prints it.
#[inline]
pub fn render_email(to: &str, subject: &str, body: &str) -> String {
    format!("\nTo: {to}\nSubject: {subject}\n{body} \n\n")
}

/// A stub that "sends" an email by printing it to the console.
///
/// Nothing is delivered. The tool always succeeds and returns nothing.
pub struct SendEmailTool {
    schema: ToolSchema,
    console: Console,
}

impl SendEmailTool {
    /// Creates the tool printing to the given console.
    pub fn new(console: Console) -> Self {
        let schema = ToolSchema::new(
            "send_email",
            "Sends an email to the given recipient.",
        )
        .with_parameter(ToolParameter::required(
            "to",
            ParameterType::String,
            "Who to send the email to",
        ))
        .with_parameter(ToolParameter::required(
            "subject",
            ParameterType::String,
            "The subject of the email.",
        ))
        .with_parameter(ToolParameter::required(
            "body",
            ParameterType::String,
            "The text body of the email.",
        ));
        Self { schema, console }
    }
}

impl Tool for SendEmailTool {
    type Input = SendEmailParameters;
    type Output = ();

    #[inline]
    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    fn execute(
        &self,
        input: SendEmailParameters,
    ) -> impl Future<Output = Result<(), ToolError>> + Send + 'static {
        info!("sending an email to {}", input.to);
        self.console
            .print(&render_email(&input.to, &input.subject, &input.body));
        ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use schemars::schema_for;
    use serde_json::{Value, json};

    use super::*;

    fn sorted_strings(value: &Value) -> BTreeSet<&str> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_schema_matches_parameters() {
        let (console, _) = Console::capture();
        let tool = SendEmailTool::new(console);
        let declared = tool.schema().parameters_json_schema();
        let derived = schema_for!(SendEmailParameters).to_value();

        assert_eq!(declared["type"], "object");
        assert_eq!(
            sorted_strings(&declared["required"]),
            sorted_strings(&derived["required"])
        );
        let declared_props = declared["properties"].as_object().unwrap();
        let derived_props = derived["properties"].as_object().unwrap();
        assert_eq!(declared_props.len(), derived_props.len());
        for (name, prop) in declared_props {
            let derived_prop = &derived_props[name];
            assert_eq!(prop["type"], derived_prop["type"], "type of {name}");
            assert_eq!(
                prop["description"], derived_prop["description"],
                "description of {name}"
            );
        }
    }

    #[tokio::test]
    async fn test_execute_prints_email() {
        let (console, output) = Console::capture();
        let tool = SendEmailTool::new(console);
        tool.execute(SendEmailParameters {
            to: "a@b.com".to_owned(),
            subject: "Expense Claim".to_owned(),
            body: "Lunch $10\nTotal: $10".to_owned(),
        })
        .await
        .unwrap();
        assert_eq!(
            output.contents(),
            "\nTo: a@b.com\nSubject: Expense Claim\nLunch $10\nTotal: $10 \n\n"
        );
    }

    #[tokio::test]
    async fn test_execute_with_any_text() {
        let (console, output) = Console::capture();
        let tool = SendEmailTool::new(console);
        tool.execute(SendEmailParameters {
            to: String::new(),
            subject: String::new(),
            body: String::new(),
        })
        .await
        .unwrap();
        tool.execute(SendEmailParameters {
            to: "zoë@exämple.com".to_owned(),
            subject: "Frais de déplacement 出張".to_owned(),
            body: "Café: €4,50\nΣύνολο: €4,50 🧾".to_owned(),
        })
        .await
        .unwrap();
        assert_eq!(
            output.contents(),
            format!(
                "{}{}",
                render_email("", "", ""),
                "\nTo: zoë@exämple.com\nSubject: Frais de déplacement 出張\n\
                 Café: €4,50\nΣύνολο: €4,50 🧾 \n\n"
            )
        );
        assert_eq!(render_email("", "", ""), "\nTo: \nSubject: \n \n\n");
    }

    #[test]
    fn test_parameters_reject_missing_fields() {
        let result: Result<SendEmailParameters, _> =
            serde_json::from_value(json!({ "to": "a@b.c", "subject": "Hi" }));
        assert!(result.is_err());
    }
}
