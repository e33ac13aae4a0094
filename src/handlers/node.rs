//! Compute node contract: node descriptors in, node results out.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::time::Duration;

/// A compute node as declared in a workflow definition.
///
/// ```yaml
/// - id: build_image
///   type: compute
///   handler: container_ops
///   inputs:
///     operation: build
///     dockerfile: Dockerfile
///     tag: myapp:latest
///   output: build_result
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputeNode {
    pub id: String,

    /// Registered handler name (e.g. `container_ops`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,

    /// Input parameter map; `operation` selects the command template.
    #[serde(default)]
    pub inputs: Map<String, Value>,

    /// Context key for the node output; the node id is used when absent.
    #[serde(
        default,
        rename = "output",
        alias = "output_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub output_key: Option<String>,
}

impl ComputeNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    /// The context key this node's output is written under.
    pub fn result_key(&self) -> &str {
        self.output_key.as_deref().unwrap_or(&self.id)
    }

    /// Split the inputs into an operation name and its parameters.
    pub fn descriptor(&self, default_operation: &str) -> OperationDescriptor {
        OperationDescriptor::from_inputs(&self.inputs, default_operation)
    }
}

/// Declarative input to a handler: which operation, with which parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    pub operation: String,
    pub parameters: Map<String, Value>,
}

impl OperationDescriptor {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            parameters: Map::new(),
        }
    }

    /// Build a descriptor from a node's input map.
    ///
    /// A missing or null `operation` falls back to `default_operation`.
    pub fn from_inputs(inputs: &Map<String, Value>, default_operation: &str) -> Self {
        let operation = match inputs.get("operation") {
            None | Some(Value::Null) => default_operation.to_string(),
            Some(value) => render_scalar(value),
        };
        let parameters = inputs
            .iter()
            .filter(|(k, _)| k.as_str() != "operation")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            operation,
            parameters,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Template slot value, rendered as text; null or absent uses `default`.
    pub fn text(&self, key: &str, default: &str) -> String {
        match self.parameters.get(key) {
            None | Some(Value::Null) => default.to_string(),
            Some(value) => render_scalar(value),
        }
    }

    /// Optional slot value. Only non-empty strings and non-zero numbers count;
    /// booleans, null, arrays and objects are treated as absent.
    pub fn optional_text(&self, key: &str) -> Option<String> {
        match self.parameters.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Boolean flag; anything other than a JSON bool uses `default`.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        self.parameters
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Terminal status of a compute node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Completed,
    Failed,
}

/// What a handler reports back to the workflow engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeResult {
    pub node_id: String,
    pub status: NodeStatus,
    pub output: Option<Map<String, Value>>,
    pub error: Option<String>,
    #[serde(rename = "duration_seconds", serialize_with = "serialize_secs")]
    pub duration: Duration,
    pub tool_calls_used: u32,
}

impl NodeResult {
    /// A failure that produced no output.
    pub fn failed(
        node_id: impl Into<String>,
        error: impl Into<String>,
        duration: Duration,
        tool_calls_used: u32,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            status: NodeStatus::Failed,
            output: None,
            error: Some(error.into()),
            duration,
            tool_calls_used,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == NodeStatus::Completed
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_key_prefers_output_key() {
        let node = ComputeNode::new("build_image");
        assert_eq!(node.result_key(), "build_image");

        let node = node.with_output_key("build_result");
        assert_eq!(node.result_key(), "build_result");
    }

    #[test]
    fn descriptor_defaults_missing_operation() {
        let node = ComputeNode::new("n").with_input("tag", "myapp:v1");
        let descriptor = node.descriptor("build");

        assert_eq!(descriptor.operation, "build");
        assert_eq!(descriptor.text("tag", "latest"), "myapp:v1");
        assert!(!descriptor.parameters.contains_key("operation"));
    }

    #[test]
    fn descriptor_renders_non_string_values() {
        let descriptor = OperationDescriptor::new("stop")
            .with_param("container_id", 4242)
            .with_param("missing", Value::Null);

        assert_eq!(descriptor.text("container_id", ""), "4242");
        assert_eq!(descriptor.text("missing", "fallback"), "fallback");
    }

    #[test]
    fn optional_text_treats_empty_as_absent() {
        let descriptor = OperationDescriptor::new("plan").with_param("workspace", "");
        assert_eq!(descriptor.optional_text("workspace"), None);
        assert_eq!(descriptor.optional_text("other"), None);
    }

    #[test]
    fn optional_text_ignores_falsy_and_structured_values() {
        for value in [json!(false), json!(true), json!(0), json!([]), json!({}), json!(null)] {
            let descriptor =
                OperationDescriptor::new("plan").with_param("workspace", value.clone());
            assert_eq!(descriptor.optional_text("workspace"), None, "{value}");
        }

        let descriptor = OperationDescriptor::new("plan").with_param("workspace", 2);
        assert_eq!(descriptor.optional_text("workspace").as_deref(), Some("2"));
    }

    #[test]
    fn flag_ignores_non_bool_values() {
        let descriptor = OperationDescriptor::new("apply").with_param("auto_approve", "yes");
        assert!(!descriptor.flag("auto_approve", false));

        let descriptor = descriptor.with_param("auto_approve", true);
        assert!(descriptor.flag("auto_approve", false));
    }

    #[test]
    fn node_parses_from_workflow_yaml() {
        let yaml = r#"
id: apply_infra
handler: terraform_apply
inputs:
  operation: apply
  workspace: production
  auto_approve: true
output: terraform_result
"#;
        let node: ComputeNode = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(node.id, "apply_infra");
        assert_eq!(node.handler.as_deref(), Some("terraform_apply"));
        assert_eq!(node.result_key(), "terraform_result");
        assert_eq!(node.inputs["auto_approve"], json!(true));
    }

    #[test]
    fn node_result_serializes_duration_in_seconds() {
        let result = NodeResult::failed("n", "boom", Duration::from_millis(1500), 1);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["status"], json!("failed"));
        assert_eq!(value["duration_seconds"], json!(1.5));
        assert_eq!(value["tool_calls_used"], json!(1));
        assert_eq!(value["output"], Value::Null);
    }
}
