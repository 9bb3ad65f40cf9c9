//! The callable client layer and transform functions.
//!
//! The engine never talks HTTP itself. It calls operations through an
//! [`ApiClient`] by application id and generated function name, and invokes
//! user transforms through a [`TransformRegistry`] by function id.

mod http;
mod transform;

pub use http::HttpClient;
pub use transform::{FnTransforms, TransformRegistry};

use crate::error::TransportError;
use serde_json::{Map, Value};

/// Keyword arguments of a client call: parameter values by name, plus the
/// request body under [`BODY`].
pub type Kwargs = Map<String, Value>;

/// Keyword carrying the request body.
pub const BODY: &str = "body";

pub trait ApiClient: Send + Sync {
    fn call(
        &self,
        application_id: &str,
        function_name: &str,
        kwargs: &Kwargs,
    ) -> Result<Value, TransportError>;
}
