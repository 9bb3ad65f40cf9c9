//! Schema introspection.
//!
//! Turns nested JSON Schema fragments into flat lists of typed, addressable
//! nodes, and maps node ids back to dotted paths inside the nested document.
//! Flattening is pure: ids are content-addressed, so the same fragment always
//! produces the same nodes.

mod flatten;
mod id;
mod node;
mod parameters;

pub use flatten::{ARRAY_ITEM, flatten, locate};
pub use id::node_id;
pub use node::{NodeType, ParameterLocation, ParameterNode, ParentKind, SchemaNode, is_open_object};
pub use parameters::{parameter_list, parameters};
