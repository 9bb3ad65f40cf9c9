use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The JSON type of a flattened schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

impl NodeType {
    /// Reads the `type` keyword of a schema fragment. `integer` folds into
    /// `Number`, a type list takes its first non-null member and a missing
    /// type is `Null`.
    pub fn of(schema: &Value) -> Self {
        match schema.get("type") {
            Some(Value::String(name)) => Self::from_name(name),
            Some(Value::Array(names)) => names
                .iter()
                .filter_map(Value::as_str)
                .map(Self::from_name)
                .find(|t| *t != NodeType::Null)
                .unwrap_or(NodeType::Null),
            _ => NodeType::Null,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "object" => NodeType::Object,
            "array" => NodeType::Array,
            "string" => NodeType::String,
            "number" | "integer" => NodeType::Number,
            "boolean" => NodeType::Boolean,
            _ => NodeType::Null,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Object => "object",
            NodeType::Array => "array",
            NodeType::String => "string",
            NodeType::Number => "number",
            NodeType::Boolean => "boolean",
            NodeType::Null => "null",
        }
    }

    /// Objects and arrays hold other nodes and are not addressed directly,
    /// unless the object is open (see [`is_open_object`]).
    pub fn is_container(&self) -> bool {
        matches!(self, NodeType::Object | NodeType::Array)
    }
}

/// An object schema that declares no properties. It accepts any value and
/// is mapped as a whole, like a scalar field.
pub fn is_open_object(schema: &Value) -> bool {
    NodeType::of(schema) == NodeType::Object
        && schema
            .get("properties")
            .and_then(Value::as_object)
            .is_none_or(|properties| properties.is_empty())
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of the container a node sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParentKind {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "array")]
    Array,
}

/// One addressable field extracted from a nested JSON Schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub parent_id: Option<String>,
    pub parent_kind: ParentKind,
    pub in_array: bool,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
        }
    }
}

/// A path or query parameter of an API operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub location: ParameterLocation,
    pub required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_type_folding() {
        assert_eq!(NodeType::of(&json!({"type": "integer"})), NodeType::Number);
        assert_eq!(NodeType::of(&json!({"type": ["null", "string"]})), NodeType::String);
        assert_eq!(NodeType::of(&json!({"properties": {}})), NodeType::Null);
        assert!(NodeType::Array.is_container());
        assert!(!NodeType::Boolean.is_container());
    }

    #[test]
    fn test_parent_kind_wire_form() {
        assert_eq!(serde_json::to_value(ParentKind::None).unwrap(), json!(""));
        assert_eq!(serde_json::to_value(ParentKind::Array).unwrap(), json!("array"));
    }
}
