//! # Tool System for the Clova Agent SDK
//!
//! Tools are the capabilities a model may invoke mid-conversation. Each tool
//! couples a declarative schema (what the model sees) with an async handler
//! (what actually runs). Schemas are plain serializable data in the upstream
//! function-calling format:
//!
//! ```json
//! {
//!   "type": "function",
//!   "function": {
//!     "name": "search_news",
//!     "description": "Search for news articles...",
//!     "parameters": {
//!       "type": "object",
//!       "properties": {
//!         "query": {"type": "string", "description": "..."}
//!       },
//!       "required": ["query"]
//!     }
//!   }
//! }
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! 1. Definition:   build a schema + handler with the `tool()` builder
//! 2. Registration: collect tools into a ToolRegistry (schemas validated here)
//! 3. Invocation:   the model issues a ToolCall naming a registered tool
//! 4. Validation:   arguments are checked against the declared schema
//! 5. Execution:    the handler runs and renders a human-readable result
//! ```
//!
//! Registry construction fails fast on malformed schemas (a `required` name
//! with no matching property, an empty `enum` set, a duplicate tool name), so
//! a process never starts offering tools it cannot honor.
//!
//! ## Handler pattern
//!
//! Handlers are stored as `Arc<dyn Fn(Value) -> Pin<Box<dyn Future>>>`:
//! `Arc` so one handler can be shared by the registry and cheap clones of it,
//! `Pin<Box<...>>` so handlers with different concrete future types fit one
//! collection, `Send + Sync` so execution can hop tokio worker threads.
//! Handlers return a rendered `String` because tool results travel back to
//! the model as plain message text.
//!
//! ## Example
//!
//! ```rust,no_run
//! use clova_agent::{tool, ParameterType, ToolRegistry};
//!
//! let echo = tool("echo", "Echo the given text back")
//!     .required_param("text", ParameterType::String, "Text to echo")
//!     .build(|args| async move {
//!         Ok(args["text"].as_str().unwrap_or_default().to_string())
//!     });
//!
//! let registry = ToolRegistry::new(vec![echo]).unwrap();
//! assert_eq!(registry.list_tools().len(), 1);
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for tool handler functions.
///
/// Takes the structured arguments object from a [`crate::ToolCall`] and
/// produces the rendered result text for the tool message.
pub type ToolHandler =
    Arc<dyn Fn(Value) -> Pin<Box<dyn Future<Output = Result<String>> + Send>> + Send + Sync>;

/// Primitive types a tool parameter may declare
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    fn matches(&self, value: &Value) -> bool {
        match self {
            ParameterType::String => value.is_string(),
            ParameterType::Number => value.is_number(),
            ParameterType::Integer => value.is_i64() || value.is_u64(),
            ParameterType::Boolean => value.is_boolean(),
            ParameterType::Array => value.is_array(),
            ParameterType::Object => value.is_object(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Number => "number",
            ParameterType::Integer => "integer",
            ParameterType::Boolean => "boolean",
            ParameterType::Array => "array",
            ParameterType::Object => "object",
        }
    }
}

/// Schema for one named tool parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolParameter {
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Closed set of accepted values, when the parameter is enumerated
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Element schema, when the parameter is an array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ToolParameter>>,
}

impl ToolParameter {
    pub fn new(param_type: ParameterType) -> Self {
        Self {
            param_type,
            description: None,
            enum_values: None,
            items: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_enum_values<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// JSON-schema-like descriptor for a tool's arguments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolParameters {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: BTreeMap<String, ToolParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ToolParameters {
    /// Check declared-schema consistency: every `required` name must refer
    /// to a declared property, and `enum` sets must be non-empty.
    pub fn validate_schema(&self) -> Result<()> {
        for name in &self.required {
            if !self.properties.contains_key(name) {
                return Err(crate::Error::config(format!(
                    "required parameter '{name}' is not declared in properties"
                )));
            }
        }
        for (name, parameter) in &self.properties {
            validate_parameter_schema(name, parameter)?;
        }
        Ok(())
    }

    /// Check a tool call's arguments against this schema.
    ///
    /// Arguments must be a JSON object, every required parameter must be
    /// present (null counts as absent), and present values must match their
    /// declared type and enum set. Undeclared keys are ignored, matching the
    /// permissive default of JSON Schema.
    pub fn validate_arguments(&self, arguments: &Value) -> Result<()> {
        let object = arguments
            .as_object()
            .ok_or_else(|| crate::Error::schema("arguments must be a JSON object"))?;

        for name in &self.required {
            let present = object.get(name).map(|v| !v.is_null()).unwrap_or(false);
            if !present {
                return Err(crate::Error::schema(format!(
                    "missing required parameter '{name}'"
                )));
            }
        }

        for (name, value) in object {
            if value.is_null() {
                continue;
            }
            let Some(parameter) = self.properties.get(name) else {
                continue;
            };
            if !parameter.param_type.matches(value) {
                return Err(crate::Error::schema(format!(
                    "parameter '{name}' must be of type {}",
                    parameter.param_type.name()
                )));
            }
            if let Some(allowed) = &parameter.enum_values {
                let as_str = value.as_str().unwrap_or_default();
                if !allowed.iter().any(|candidate| candidate == as_str) {
                    return Err(crate::Error::schema(format!(
                        "parameter '{name}' must be one of [{}]",
                        allowed.join(", ")
                    )));
                }
            }
        }
        Ok(())
    }
}

fn validate_parameter_schema(name: &str, parameter: &ToolParameter) -> Result<()> {
    if let Some(values) = &parameter.enum_values {
        if values.is_empty() {
            return Err(crate::Error::config(format!(
                "parameter '{name}' declares an empty enum set"
            )));
        }
    }
    if let Some(items) = &parameter.items {
        validate_parameter_schema(name, items)?;
    }
    Ok(())
}

/// A callable capability as the model sees it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: ToolFunction,
}

/// Name, guidance text, and argument schema for one tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolFunction {
    pub name: String,
    pub description: String,
    pub parameters: ToolParameters,
}

impl Tool {
    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn description(&self) -> &str {
        &self.function.description
    }
}

/// A tool schema bound to its executable handler
#[derive(Clone)]
pub struct RegisteredTool {
    tool: Tool,
    handler: ToolHandler,
}

impl RegisteredTool {
    pub fn new<F, Fut>(tool: Tool, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        Self {
            tool,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        }
    }

    pub fn name(&self) -> &str {
        self.tool.name()
    }

    /// The serializable schema offered to the model
    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn parameters(&self) -> &ToolParameters {
        &self.tool.function.parameters
    }

    /// Run the handler with already-validated arguments
    pub async fn invoke(&self, arguments: Value) -> Result<String> {
        (self.handler)(arguments).await
    }
}

// Handler closures have no useful Debug form, show the schema only.
impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("tool", &self.tool)
            .finish()
    }
}

/// Fixed, ordered mapping from tool name to its schema and handler.
///
/// Construction validates every schema once, so `resolve` and
/// `list_tools` never have to re-check. The registration order is
/// preserved and used verbatim when tools are offered in a request.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<RegisteredTool>) -> Result<Self> {
        for (index, registered) in tools.iter().enumerate() {
            let name = registered.name();
            if tools[..index].iter().any(|other| other.name() == name) {
                return Err(crate::Error::config(format!(
                    "duplicate tool name '{name}'"
                )));
            }
            registered.parameters().validate_schema()?;
        }
        Ok(Self { tools })
    }

    /// Schemas in registration order, ready to embed in a request
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.tool.clone()).collect()
    }

    /// Look a capability up by name
    pub fn resolve(&self, name: &str) -> Result<&RegisteredTool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| crate::Error::unknown_tool(name))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Start building a tool definition.
///
/// ```rust,no_run
/// use clova_agent::{tool, ParameterType};
///
/// let t = tool("get_time", "Get the current time for a timezone")
///     .required_param("timezone", ParameterType::String, "IANA timezone name")
///     .param("format", ParameterType::String, "Optional strftime format")
///     .build(|_args| async move { Ok("12:00".to_string()) });
/// ```
pub fn tool(name: impl Into<String>, description: impl Into<String>) -> ToolBuilder {
    ToolBuilder {
        name: name.into(),
        description: description.into(),
        properties: BTreeMap::new(),
        required: Vec::new(),
    }
}

/// Builder for a [`RegisteredTool`]
#[derive(Debug)]
pub struct ToolBuilder {
    name: String,
    description: String,
    properties: BTreeMap<String, ToolParameter>,
    required: Vec<String>,
}

impl ToolBuilder {
    /// Declare an optional parameter
    pub fn param(
        mut self,
        name: impl Into<String>,
        param_type: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        self.properties.insert(
            name.into(),
            ToolParameter::new(param_type).with_description(description),
        );
        self
    }

    /// Declare a required parameter
    pub fn required_param(
        mut self,
        name: impl Into<String>,
        param_type: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(
            name,
            ToolParameter::new(param_type).with_description(description),
        );
        self
    }

    /// Declare an optional string parameter constrained to a closed value set
    pub fn enum_param<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.properties.insert(
            name.into(),
            ToolParameter::new(ParameterType::String)
                .with_description(description)
                .with_enum_values(values),
        );
        self
    }

    /// Attach the handler and produce the registrable tool
    pub fn build<F, Fut>(self, handler: F) -> RegisteredTool
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        let tool = Tool {
            tool_type: "function".to_string(),
            function: ToolFunction {
                name: self.name,
                description: self.description,
                parameters: ToolParameters {
                    schema_type: "object".to_string(),
                    properties: self.properties,
                    required: self.required,
                },
            },
        };
        RegisteredTool::new(tool, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tool() -> RegisteredTool {
        tool("search_news", "Search for news articles")
            .required_param("query", ParameterType::String, "Keywords to search for")
            .param("fromDate", ParameterType::String, "Start date (YYYY-MM-DD)")
            .enum_param(
                "sortBy",
                "Sort order",
                ["relevancy", "popularity", "publishedAt"],
            )
            .build(|args| async move {
                Ok(format!(
                    "searched for {}",
                    args["query"].as_str().unwrap_or_default()
                ))
            })
    }

    #[test]
    fn test_tool_builder_schema() {
        let registered = sample_tool();
        let tool = registered.tool();
        assert_eq!(tool.tool_type, "function");
        assert_eq!(tool.name(), "search_news");
        assert_eq!(tool.function.parameters.schema_type, "object");
        assert_eq!(tool.function.parameters.required, vec!["query"]);
        assert_eq!(tool.function.parameters.properties.len(), 3);
    }

    #[test]
    fn test_tool_wire_serialization() {
        let registered = sample_tool();
        let json = serde_json::to_value(registered.tool()).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "search_news");
        assert_eq!(json["function"]["parameters"]["type"], "object");
        assert_eq!(
            json["function"]["parameters"]["properties"]["query"]["type"],
            "string"
        );
        assert_eq!(
            json["function"]["parameters"]["properties"]["sortBy"]["enum"][0],
            "relevancy"
        );
        assert_eq!(json["function"]["parameters"]["required"][0], "query");
    }

    #[test]
    fn test_registry_resolves_by_name() {
        let registry = ToolRegistry::new(vec![sample_tool()]).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("search_news").is_ok());

        let err = registry.resolve("search_weather").unwrap_err();
        assert!(matches!(err, crate::Error::UnknownTool(_)));
    }

    #[test]
    fn test_registry_preserves_registration_order() {
        let first = tool("alpha", "first").build(|_| async { Ok(String::new()) });
        let second = tool("beta", "second").build(|_| async { Ok(String::new()) });
        let registry = ToolRegistry::new(vec![first, second]).unwrap();
        let names: Vec<_> = registry
            .list_tools()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_registry_rejects_duplicate_names() {
        let a = tool("same", "one").build(|_| async { Ok(String::new()) });
        let b = tool("same", "two").build(|_| async { Ok(String::new()) });
        let err = ToolRegistry::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_registry_rejects_dangling_required_name() {
        let mut bad = tool("bad", "broken schema")
            .required_param("query", ParameterType::String, "ok")
            .build(|_| async { Ok(String::new()) });
        bad.tool.function.parameters.required.push("ghost".to_string());
        let err = ToolRegistry::new(vec![bad]).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_registry_rejects_empty_enum() {
        let mut bad = tool("bad", "broken schema")
            .enum_param("mode", "pick one", ["a"])
            .build(|_| async { Ok(String::new()) });
        bad.tool
            .function
            .parameters
            .properties
            .get_mut("mode")
            .unwrap()
            .enum_values = Some(vec![]);
        let err = ToolRegistry::new(vec![bad]).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_argument_validation_accepts_valid_arguments() {
        let registered = sample_tool();
        let params = registered.parameters();
        assert!(params.validate_arguments(&json!({"query": "ai"})).is_ok());
        assert!(
            params
                .validate_arguments(&json!({"query": "ai", "sortBy": "popularity"}))
                .is_ok()
        );
        // undeclared keys are tolerated
        assert!(
            params
                .validate_arguments(&json!({"query": "ai", "pageSize": 5}))
                .is_ok()
        );
    }

    #[test]
    fn test_argument_validation_rejects_bad_arguments() {
        let registered = sample_tool();
        let params = registered.parameters();

        // not an object
        assert!(matches!(
            params.validate_arguments(&json!("query")),
            Err(crate::Error::Schema(_))
        ));
        // missing required
        assert!(matches!(
            params.validate_arguments(&json!({"sortBy": "relevancy"})),
            Err(crate::Error::Schema(_))
        ));
        // null does not satisfy required
        assert!(matches!(
            params.validate_arguments(&json!({"query": null})),
            Err(crate::Error::Schema(_))
        ));
        // wrong type
        assert!(matches!(
            params.validate_arguments(&json!({"query": 42})),
            Err(crate::Error::Schema(_))
        ));
        // value outside the enum set
        assert!(matches!(
            params.validate_arguments(&json!({"query": "ai", "sortBy": "newest"})),
            Err(crate::Error::Schema(_))
        ));
    }

    #[test]
    fn test_registered_tool_invoke() {
        let registered = sample_tool();
        let rendered = tokio_test::block_on(registered.invoke(json!({"query": "rust"}))).unwrap();
        assert_eq!(rendered, "searched for rust");
    }

    #[test]
    fn test_registered_tool_debug_omits_handler() {
        let debug = format!("{:?}", sample_tool());
        assert!(debug.contains("search_news"));
        assert!(!debug.contains("handler"));
    }
}
