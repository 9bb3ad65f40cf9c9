//! Application documents: one imported API with its servers, credentials and
//! the already resolved schemas of its operations.

use crate::connection::function_name;
use crate::error::SchemaError;
use crate::mapping::OperationEndpoint;
use crate::schema::parameter_list;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderItem {
    pub name: String,
    pub value: String,
}

/// Credentials attached to every call made to an application.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Auth {
    #[default]
    None,
    Header { items: Vec<HeaderItem> },
    Basic { username: String, password: String },
}

/// One operation of an application with its resolved schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOperation {
    pub path: String,
    /// Lowercase HTTP method.
    pub operation: String,
    #[serde(default)]
    pub request_schema: Option<Value>,
    #[serde(default)]
    pub response_schema: Option<Value>,
    /// Raw OpenAPI parameter objects.
    #[serde(default)]
    pub parameters: Vec<Value>,
}

impl ApiOperation {
    pub fn function_name(&self) -> String {
        function_name(&self.path, &self.operation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub servers: Vec<String>,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub operations: Vec<ApiOperation>,
}

impl Application {
    pub fn operation(&self, path: &str, operation: &str) -> Option<&ApiOperation> {
        self.operations
            .iter()
            .find(|op| op.path == path && op.operation.eq_ignore_ascii_case(operation))
    }

    /// Looks an operation up by its client function name.
    pub fn function(&self, function_name: &str) -> Option<&ApiOperation> {
        self.operations
            .iter()
            .find(|op| op.function_name() == function_name)
    }

    /// Builds a flattened source endpoint from the operation's response schema.
    pub fn source_endpoint(&self, path: &str, operation: &str) -> Result<OperationEndpoint, SchemaError> {
        let op = self.require(path, operation)?;
        let schema = op.response_schema.clone().unwrap_or(Value::Null);
        let endpoint = OperationEndpoint::source(&self.id, &op.path, &op.operation, schema);
        let parameters = parameter_list(&op.parameters, &endpoint.operation_namespace())?;
        Ok(endpoint.with_parameters(parameters))
    }

    /// Builds a flattened target endpoint from the operation's request schema.
    pub fn target_endpoint(&self, path: &str, operation: &str) -> Result<OperationEndpoint, SchemaError> {
        let op = self.require(path, operation)?;
        let schema = op.request_schema.clone().unwrap_or(Value::Null);
        let endpoint = OperationEndpoint::target(&self.id, &op.path, &op.operation, schema);
        let parameters = parameter_list(&op.parameters, &endpoint.operation_namespace())?;
        Ok(endpoint.with_parameters(parameters))
    }

    fn require(&self, path: &str, operation: &str) -> Result<&ApiOperation, SchemaError> {
        self.operation(path, operation)
            .ok_or_else(|| SchemaError::UnknownOperation {
                application_id: self.id.clone(),
                path: path.to_string(),
                operation: operation.to_string(),
            })
    }
}
