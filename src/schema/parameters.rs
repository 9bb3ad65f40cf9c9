use super::id::node_id;
use super::node::{NodeType, ParameterLocation, ParameterNode};
use crate::error::SchemaError;
use serde_json::Value;

/// Extracts the path and query parameters of an OpenAPI operation object.
/// Header and cookie parameters are not addressable and are ignored.
pub fn parameters(operation: &Value, namespace: &str) -> Result<Vec<ParameterNode>, SchemaError> {
    match operation.get("parameters") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(list)) => parameter_list(list, namespace),
        Some(_) => Err(SchemaError::ParametersNotList(namespace.to_string())),
    }
}

/// Same as [`parameters`] for an already extracted `parameters` list.
pub fn parameter_list(list: &[Value], namespace: &str) -> Result<Vec<ParameterNode>, SchemaError> {
    let mut nodes = Vec::with_capacity(list.len());
    for (index, parameter) in list.iter().enumerate() {
        let location = match parameter.get("in").and_then(Value::as_str) {
            Some("path") => ParameterLocation::Path,
            Some("query") => ParameterLocation::Query,
            _ => continue,
        };

        let invalid = || SchemaError::InvalidParameter {
            namespace: namespace.to_string(),
            index,
        };
        let name = parameter.get("name").and_then(Value::as_str).ok_or_else(invalid)?;
        let schema = parameter
            .get("schema")
            .filter(|s| s.get("type").is_some())
            .ok_or_else(invalid)?;

        // Path parameters are always required in OpenAPI.
        let required = parameter
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(location == ParameterLocation::Path);

        nodes.push(ParameterNode {
            id: node_id(namespace, &format!("/parameters/{}/{}", location.as_str(), name)),
            name: name.to_string(),
            node_type: NodeType::of(schema),
            location,
            required,
        });
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_path_and_query_only() {
        let operation = json!({
            "parameters": [
                {"name": "userId", "in": "path", "schema": {"type": "integer"}},
                {"name": "limit", "in": "query", "schema": {"type": "integer"}},
                {"name": "X-Trace", "in": "header", "schema": {"type": "string"}}
            ]
        });
        let params = parameters(&operation, "crm:/users/{userId}:get").unwrap();
        assert_eq!(params.len(), 2);
        assert!(params[0].required);
        assert_eq!(params[0].node_type, NodeType::Number);
        assert!(!params[1].required);
        assert_eq!(params[1].location, ParameterLocation::Query);
    }

    #[test]
    fn test_parameter_without_schema_type_is_rejected() {
        let operation = json!({"parameters": [{"name": "q", "in": "query", "schema": {}}]});
        assert_eq!(
            parameters(&operation, "ns"),
            Err(SchemaError::InvalidParameter { namespace: "ns".into(), index: 0 })
        );
    }
}
