use serde_json::{Map, Value, json};

use crate::ModelTool;

/// The JSON type of a tool parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterType {
    /// A text value.
    String,
    /// A whole number.
    Integer,
    /// Any number.
    Number,
    /// `true` or `false`.
    Boolean,
}

impl ParameterType {
    /// Returns the JSON schema type name.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Integer => "integer",
            ParameterType::Number => "number",
            ParameterType::Boolean => "boolean",
        }
    }
}

/// One named parameter of a tool.
///
/// The description is read by the model when it decides whether and how
/// to call the tool, so it is part of the protocol surface.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolParameter {
    /// Name of the parameter.
    pub name: String,
    /// Type of the parameter.
    pub ty: ParameterType,
    /// Description shown to the model.
    pub description: String,
    /// Whether the model must always provide the parameter.
    pub required: bool,
}

impl ToolParameter {
    /// Creates a required parameter.
    #[inline]
    pub fn required<N: Into<String>, D: Into<String>>(
        name: N,
        ty: ParameterType,
        description: D,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            description: description.into(),
            required: true,
        }
    }

    /// Creates an optional parameter.
    #[inline]
    pub fn optional<N: Into<String>, D: Into<String>>(
        name: N,
        ty: ParameterType,
        description: D,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, ty, description)
        }
    }
}

/// A statically declared description of a tool, which is what the model
/// sees of it.
///
/// Tool implementations only deserialize their input and never inspect
/// this value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolSchema {
    /// Name of the tool.
    pub name: String,
    /// Description of the tool.
    pub description: String,
    /// Parameters in declaration order.
    pub parameters: Vec<ToolParameter>,
}

impl ToolSchema {
    /// Creates a schema without parameters.
    #[inline]
    pub fn new<N: Into<String>, D: Into<String>>(name: N, description: D) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: vec![],
        }
    }

    /// Appends a parameter.
    #[inline]
    pub fn with_parameter(mut self, parameter: ToolParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Renders the parameters as a JSON schema object.
    pub fn parameters_json_schema(&self) -> Value {
        let mut properties = Map::with_capacity(self.parameters.len());
        let mut required = vec![];
        for param in &self.parameters {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.ty.as_str(),
                    "description": param.description,
                }),
            );
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    /// Converts the schema to the definition sent along with requests.
    #[inline]
    pub fn to_model_tool(&self) -> ModelTool {
        ModelTool {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters_json_schema(),
        }
    }
}
