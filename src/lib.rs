//! # apisync - API Mapping and Synchronization Engine
//!
//! **apisync** keeps a target REST API in sync with a source REST API from a
//! set of user-drawn field correspondences. Schemas are flattened into
//! addressable nodes, correspondences are compiled ahead of time into a fill
//! plan, and a background worker per connection polls the source, detects
//! change and pushes the computed payload to the target.
//!
//! ## Core Workflow
//!
//! 1.  **Describe Your APIs**: Load each API as an [`application::Application`]
//!     with the resolved request and response schemas of its operations.
//! 2.  **Map Endpoints**: Build [`mapping::EndpointMapping`]s between a source
//!     and a target endpoint, and add [`mapping::Correspondence`]s between
//!     their flattened node ids.
//! 3.  **Compile**: [`connection::Connection::save_mappings`] runs the
//!     [`compiler::Compiler`] over every mapping and records which ones are
//!     complete.
//! 4.  **Synchronize**: Hand the connection to a [`sync::SessionManager`] and
//!     start a session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apisync::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let users = OperationEndpoint::source(
//!         "crm",
//!         "/users",
//!         "get",
//!         json!({"type": "object", "properties": {"name": {"type": "string"}}}),
//!     );
//!     let contacts = OperationEndpoint::target(
//!         "mail",
//!         "/contacts",
//!         "post",
//!         json!({"type": "object", "properties": {"fullName": {"type": "string"}}}),
//!     );
//!
//!     // Node ids are stable, so they can be looked up by name.
//!     let name = users.schema_nodes.iter().find(|n| n.name == "name").unwrap().id.clone();
//!     let full_name = contacts.schema_nodes.iter().find(|n| n.name == "fullName").unwrap().id.clone();
//!
//!     let mut connection = Connection::new("c1", "CRM to Mail");
//!     connection.endpoint_mappings.push(
//!         EndpointMapping::new("m1", Endpoint::Operation(users), Endpoint::Operation(contacts))
//!             .with_correspondence(Correspondence::direct("e1", name, full_name)),
//!     );
//!     let failures = connection.save_mappings();
//!     assert!(failures.is_empty());
//!
//!     let config = SyncConfig::default();
//!     let client = HttpClient::new(Vec::new(), config.http_timeout())?;
//!     let manager = SessionManager::new(
//!         Arc::new(MemoryStore::new().with_connection(connection)),
//!         Arc::new(client),
//!         Arc::new(FnTransforms::new()),
//!         Arc::new(MemoryCache::new()),
//!         config,
//!     );
//!     manager.start_with_defaults("c1")?;
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod client;
pub mod compiler;
pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod mapping;
pub mod matcher;
pub mod prelude;
pub mod recommend;
pub mod schema;
pub mod store;
pub mod sync;
