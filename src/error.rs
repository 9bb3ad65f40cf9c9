use thiserror::Error;

/// Errors raised while reading schema fragments and operation objects.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Parameter #{index} of operation '{namespace}' has no name or schema type")]
    InvalidParameter { namespace: String, index: usize },

    #[error("Operation '{0}' has a 'parameters' entry that is not a list")]
    ParametersNotList(String),

    #[error("Application '{application_id}' has no operation '{operation} {path}'")]
    UnknownOperation {
        application_id: String,
        path: String,
        operation: String,
    },
}

/// Errors that can occur while compiling an endpoint mapping into a fill plan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(
        "Correspondence '{correspondence_id}': {side} node '{node_id}' is not a schema field, parameter or variable"
    )]
    UnresolvedNode {
        correspondence_id: String,
        side: &'static str,
        node_id: String,
    },

    #[error(
        "Correspondence '{correspondence_id}': {side} node '{node_id}' matches more than one role ({roles})"
    )]
    AmbiguousNode {
        correspondence_id: String,
        side: &'static str,
        node_id: String,
        roles: String,
    },

    #[error(
        "Correspondence '{correspondence_id}': location of {side} node '{node_id}' could not be found in the schema"
    )]
    PathNotFound {
        correspondence_id: String,
        side: &'static str,
        node_id: String,
    },

    #[error(
        "Correspondence '{correspondence_id}': duplicate location for {side} node '{node_id}' ({paths})"
    )]
    DuplicatePath {
        correspondence_id: String,
        side: &'static str,
        node_id: String,
        paths: String,
    },

    #[error("Correspondence '{correspondence_id}': target path '{path}' does not exist in the fill plan")]
    InvalidPlanPath {
        correspondence_id: String,
        path: String,
    },
}

impl CompileError {
    /// The correspondence the error was raised for.
    pub fn correspondence_id(&self) -> &str {
        match self {
            CompileError::UnresolvedNode {
                correspondence_id, ..
            }
            | CompileError::AmbiguousNode {
                correspondence_id, ..
            }
            | CompileError::PathNotFound {
                correspondence_id, ..
            }
            | CompileError::DuplicatePath {
                correspondence_id, ..
            }
            | CompileError::InvalidPlanPath {
                correspondence_id, ..
            } => correspondence_id,
        }
    }
}

/// A value needed during a sync cycle could not be obtained.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("Variable '{0}' does not exist on this connection")]
    UnknownVariable(String),

    #[error("Required parameter '{0}' has no correspondence feeding it")]
    UnfedParameter(String),

    #[error("Path '{0}' cannot be read before the source response is available")]
    NoResponse(String),

    #[error("Path '{path}' does not exist in the source response")]
    MissingPath { path: String },

    #[error("Endpoint mapping '{0}' has no compiled plan")]
    MissingPlan(String),

    #[error("Resolving '{0}' exceeded the maximum depth; the correspondences form a cycle")]
    CyclicParameter(String),
}

/// A call to a source or target endpoint failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Application '{0}' is unknown to the client")]
    UnknownApplication(String),

    #[error("Application '{application_id}' has no operation named '{function}'")]
    UnknownFunction {
        application_id: String,
        function: String,
    },

    #[error("Application '{0}' has no server url")]
    NoServer(String),

    #[error("Request to '{url}' failed: {message}")]
    Request { url: String, message: String },

    #[error("Request to '{url}' returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Response from '{url}' could not be decoded: {message}")]
    Decode { url: String, message: String },
}

/// A user-supplied transform function failed or could not be found.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Transform function '{0}' is not registered")]
    NotFound(String),

    #[error("Transform function '{function_id}' failed: {message}")]
    Failed {
        function_id: String,
        message: String,
    },
}

/// Rejected session operations. These are surfaced to the caller and are not
/// logged as failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Connection '{0}' is already being synchronized")]
    AlreadyRunning(String),

    #[error("Connection '{0}' is not being synchronized")]
    NotRunning(String),

    #[error("Connection '{connection_id}' is not complete: {state}")]
    Incomplete {
        connection_id: String,
        state: String,
    },

    #[error("Connection '{0}' has no complete endpoint mapping to synchronize")]
    NoSyncableMapping(String),
}

/// Errors raised by configuration or cache stores.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("Application '{0}' not found")]
    ApplicationNotFound(String),

    #[error("Variable '{variable_id}' not found on connection '{connection_id}'")]
    VariableNotFound {
        connection_id: String,
        variable_id: String,
    },

    #[error("Store failure: {0}")]
    Backend(String),
}

/// Errors while persisting or loading compiled mapping artifacts.
#[derive(Error, Debug, Clone)]
pub enum ArtifactError {
    #[error("Artifact error: {0}")]
    Generic(String),
}

/// Errors while loading engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything that can go wrong inside the synchronization engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Could not spawn worker thread: {0}")]
    Spawn(String),
}
