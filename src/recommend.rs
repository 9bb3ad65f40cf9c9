//! Turns ranked endpoint suggestions into endpoint mapping stubs.

use crate::application::Application;
use crate::connection::Connection;
use crate::error::SchemaError;
use crate::mapping::{Endpoint, EndpointMapping};
use crate::schema::node_id;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Suggestions below this confidence are dropped by default.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRef {
    pub application_id: String,
    pub path: String,
    pub operation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub source: EndpointRef,
    pub target: EndpointRef,
    pub confidence: f64,
}

/// The external ranking model.
pub trait Recommender {
    fn suggest(&self, application_ids: &[String]) -> Vec<Suggestion>;
}

/// Orders a suggested pair so the reading side is the source. Only a `get`
/// paired with a `post`, `put` or `delete` can be synchronized.
fn orient(suggestion: &Suggestion) -> Option<(&EndpointRef, &EndpointRef)> {
    let writes = |op: &str| matches!(op, "post" | "put" | "delete");
    let a = suggestion.source.operation.to_lowercase();
    let b = suggestion.target.operation.to_lowercase();
    if a == "get" && writes(&b) {
        Some((&suggestion.source, &suggestion.target))
    } else if b == "get" && writes(&a) {
        Some((&suggestion.target, &suggestion.source))
    } else {
        None
    }
}

fn is_same(endpoint: &Endpoint, reference: &EndpointRef) -> bool {
    endpoint.as_operation().is_some_and(|op| {
        op.application_id == reference.application_id
            && op.path == reference.path
            && op.operation.eq_ignore_ascii_case(&reference.operation)
    })
}

/// Adds one correspondence-less stub per usable suggestion to `connection`
/// and returns how many were added. Incompatible pairs, pairs below
/// `min_confidence` and pairs the connection already maps are skipped.
pub fn apply_suggestions(
    connection: &mut Connection,
    applications: &[Application],
    suggestions: &[Suggestion],
    min_confidence: f64,
) -> Result<usize, SchemaError> {
    let mut added = 0;
    for suggestion in suggestions {
        if suggestion.confidence < min_confidence {
            continue;
        }
        let Some((source, target)) = orient(suggestion) else {
            debug!(?suggestion, "Skipping incompatible suggestion");
            continue;
        };
        let exists = connection
            .endpoint_mappings
            .iter()
            .any(|m| is_same(&m.source, source) && is_same(&m.target, target));
        if exists {
            continue;
        }

        let Some(source_app) = applications.iter().find(|a| a.id == source.application_id) else {
            continue;
        };
        let Some(target_app) = applications.iter().find(|a| a.id == target.application_id) else {
            continue;
        };

        let source_endpoint = source_app.source_endpoint(&source.path, &source.operation)?;
        let target_endpoint = target_app.target_endpoint(&target.path, &target.operation)?;
        let id = node_id(
            &connection.id,
            &format!(
                "/recommendations/{}#{}",
                source_endpoint.operation_namespace(),
                target_endpoint.operation_namespace()
            ),
        );

        let mut stub = EndpointMapping::new(
            id,
            Endpoint::Operation(source_endpoint),
            Endpoint::Operation(target_endpoint),
        );
        stub.recommendation = true;
        connection.endpoint_mappings.push(stub);
        added += 1;
    }

    if added > 0 {
        connection.update_state();
    }
    Ok(added)
}

/// Asks `recommender` for suggestions over the connection's applications and
/// applies those at or above [`DEFAULT_MIN_CONFIDENCE`].
pub fn recommend<R: Recommender + ?Sized>(
    recommender: &R,
    connection: &mut Connection,
    applications: &[Application],
) -> Result<usize, SchemaError> {
    let suggestions = recommender.suggest(&connection.applications);
    apply_suggestions(connection, applications, &suggestions, DEFAULT_MIN_CONFIDENCE)
}
