//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the apisync crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use apisync::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let mut connection: Connection =
//!     serde_json::from_str(&std::fs::read_to_string("path/to/connection.json")?)?;
//! for (mapping_id, error) in connection.save_mappings() {
//!     println!("{}: {}", mapping_id, error);
//! }
//! println!("State: {}", connection.state);
//! # Ok(())
//! # }
//! ```

// Schemas and matching
pub use crate::matcher::{Matcher, SimilarityReport, compare};
pub use crate::schema::{NodeType, ParameterNode, SchemaNode, flatten, locate, parameters};

// Mapping model and compilation
pub use crate::application::{Application, Auth};
pub use crate::compiler::Compiler;
pub use crate::connection::{Connection, ConnectionState, VariableContext, function_name};
pub use crate::mapping::{
    CompiledMapping, Correspondence, Endpoint, EndpointMapping, FillPlan, Locator, MappingKind,
    OperationEndpoint, Variable, VariableValue,
};

// Synchronization
pub use crate::client::{ApiClient, FnTransforms, HttpClient, Kwargs, TransformRegistry};
pub use crate::config::{LogConfig, SyncConfig};
pub use crate::store::{CacheStore, ConfigStore, MemoryCache, MemoryStore};
pub use crate::sync::{SessionLog, SessionManager, SessionState};

// Error types
pub use crate::error::{CompileError, StateError, SyncError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
