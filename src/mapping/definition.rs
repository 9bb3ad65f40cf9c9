use super::artifact::CompiledMapping;
use crate::error::CompileError;
use crate::schema::{ParameterNode, SchemaNode, flatten};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// How a correspondence moves its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CorrespondenceKind {
    Direct,
    #[serde(rename_all = "camelCase")]
    ExternalTransform { function_id: String },
}

/// One field-to-field edge inside an endpoint mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correspondence {
    pub id: String,
    /// Node id on the source side.
    pub source: String,
    /// Node id on the target side.
    pub target: String,
    pub kind: CorrespondenceKind,
}

impl Correspondence {
    pub fn direct(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind: CorrespondenceKind::Direct,
        }
    }

    pub fn transform(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        function_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind: CorrespondenceKind::ExternalTransform {
                function_id: function_id.into(),
            },
        }
    }

    pub fn function_id(&self) -> Option<&str> {
        match &self.kind {
            CorrespondenceKind::Direct => None,
            CorrespondenceKind::ExternalTransform { function_id } => Some(function_id),
        }
    }
}

/// One side of an endpoint mapping bound to a live API operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationEndpoint {
    pub application_id: String,
    pub path: String,
    /// Lowercase HTTP method, e.g. `get`.
    pub operation: String,
    /// Namespace the schema was flattened under.
    pub namespace: String,
    /// The response schema for a source, the request body schema for a target.
    pub schema: Value,
    pub schema_nodes: Vec<SchemaNode>,
    #[serde(default)]
    pub parameters: Vec<ParameterNode>,
}

impl OperationEndpoint {
    /// A source endpoint: its response body is flattened without required-ness.
    pub fn source(application_id: &str, path: &str, operation: &str, response_schema: Value) -> Self {
        Self::new(application_id, path, operation, response_schema, "response", false)
    }

    /// A target endpoint: its request body is flattened with required-ness.
    pub fn target(application_id: &str, path: &str, operation: &str, request_schema: Value) -> Self {
        Self::new(application_id, path, operation, request_schema, "request", true)
    }

    fn new(
        application_id: &str,
        path: &str,
        operation: &str,
        schema: Value,
        body: &str,
        for_target: bool,
    ) -> Self {
        let operation = operation.to_lowercase();
        let namespace = format!(
            "{}:{}",
            Self::operation_namespace_of(application_id, path, &operation),
            body
        );
        let schema_nodes = flatten(&schema, &namespace, for_target);
        Self {
            application_id: application_id.to_string(),
            path: path.to_string(),
            operation,
            namespace,
            schema,
            schema_nodes,
            parameters: Vec::new(),
        }
    }

    fn operation_namespace_of(application_id: &str, path: &str, operation: &str) -> String {
        format!("{}:{}:{}", application_id, path, operation)
    }

    /// Namespace used for the operation's parameter ids.
    pub fn operation_namespace(&self) -> String {
        Self::operation_namespace_of(&self.application_id, &self.path, &self.operation)
    }

    pub fn with_parameters(mut self, parameters: Vec<ParameterNode>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Name of the generated client function for this operation.
    pub fn function_name(&self) -> String {
        crate::connection::function_name(&self.path, &self.operation)
    }

    /// Same application, path and operation.
    pub fn same_operation(&self, other: &OperationEndpoint) -> bool {
        self.application_id == other.application_id
            && self.path == other.path
            && self.operation == other.operation
    }
}

/// Either side of an endpoint mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Endpoint {
    Operation(OperationEndpoint),
    /// The connection's variable set.
    Variables,
}

impl Endpoint {
    pub fn as_operation(&self) -> Option<&OperationEndpoint> {
        match self {
            Endpoint::Operation(op) => Some(op),
            Endpoint::Variables => None,
        }
    }

    pub fn is_variables(&self) -> bool {
        matches!(self, Endpoint::Variables)
    }

    pub fn schema_nodes(&self) -> &[SchemaNode] {
        match self {
            Endpoint::Operation(op) => &op.schema_nodes,
            Endpoint::Variables => &[],
        }
    }

    pub fn parameters(&self) -> &[ParameterNode] {
        match self {
            Endpoint::Operation(op) => &op.parameters,
            Endpoint::Variables => &[],
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Operation(op) => write!(f, "{} {}", op.operation.to_uppercase(), op.path),
            Endpoint::Variables => f.write_str("Variables"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MappingKind {
    #[default]
    DirectSchema,
    ExternalTransform,
    VariableTarget,
}

/// Where an incomplete item lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonLocation {
    #[serde(rename = "target body")]
    TargetBody,
    #[serde(rename = "source parameter")]
    SourceParameter,
    #[serde(rename = "target parameter")]
    TargetParameter,
    /// The correspondence could not be compiled.
    #[serde(rename = "correspondence")]
    Correspondence,
}

impl ReasonLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonLocation::TargetBody => "target body",
            ReasonLocation::SourceParameter => "source parameter",
            ReasonLocation::TargetParameter => "target parameter",
            ReasonLocation::Correspondence => "correspondence",
        }
    }
}

/// A field or parameter that still lacks a correspondence, or a
/// correspondence that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompleteReason {
    pub name: String,
    pub location: ReasonLocation,
    #[serde(default)]
    pub detail: Option<String>,
}

impl IncompleteReason {
    pub fn new(name: impl Into<String>, location: ReasonLocation) -> Self {
        Self {
            name: name.into(),
            location,
            detail: None,
        }
    }

    /// Names the offending correspondence and keeps the error text.
    pub fn compile_failure(error: &CompileError) -> Self {
        Self {
            name: error.correspondence_id().to_string(),
            location: ReasonLocation::Correspondence,
            detail: Some(error.to_string()),
        }
    }
}

impl fmt::Display for IncompleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.location.as_str())?;
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

/// The correspondence between one source and one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointMapping {
    pub id: String,
    pub source: Endpoint,
    pub target: Endpoint,
    #[serde(default)]
    pub correspondences: Vec<Correspondence>,
    #[serde(default)]
    pub kind: MappingKind,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub incomplete_reasons: Vec<IncompleteReason>,
    /// Created from a recommendation and not yet edited by a user.
    #[serde(default)]
    pub recommendation: bool,
    #[serde(default)]
    pub compiled: Option<CompiledMapping>,
}

impl EndpointMapping {
    pub fn new(id: impl Into<String>, source: Endpoint, target: Endpoint) -> Self {
        Self {
            id: id.into(),
            source,
            target,
            correspondences: Vec::new(),
            kind: MappingKind::default(),
            complete: false,
            incomplete_reasons: Vec::new(),
            recommendation: false,
            compiled: None,
        }
    }

    pub fn with_correspondence(mut self, correspondence: Correspondence) -> Self {
        self.correspondences.push(correspondence);
        self
    }

    /// e.g. `GET /users -> POST /contacts`.
    pub fn name(&self) -> String {
        format!("{} -> {}", self.source, self.target)
    }

    /// Stores a compilation result on the mapping.
    pub fn apply(&mut self, compiled: CompiledMapping) {
        self.kind = compiled.kind;
        self.complete = compiled.complete;
        self.incomplete_reasons = compiled.incomplete_reasons.clone();
        self.compiled = Some(compiled);
    }

    /// Drops a previous compilation after a failed one and records why.
    pub fn invalidate(&mut self, error: &CompileError) {
        self.complete = false;
        self.incomplete_reasons = vec![IncompleteReason::compile_failure(error)];
        self.compiled = None;
    }
}
