use super::Side;
use crate::error::CompileError;
use crate::mapping::Endpoint;
use crate::schema::locate;
use itertools::Itertools;

/// Finds the single dotted path of a body node inside the nested schema.
pub(super) fn resolve_path(
    endpoint: &Endpoint,
    correspondence_id: &str,
    node_id: &str,
    side: Side,
) -> Result<String, CompileError> {
    let paths = match endpoint.as_operation() {
        Some(op) => locate(&op.schema, &op.namespace, node_id),
        None => Vec::new(),
    };

    match paths.len() {
        0 => Err(CompileError::PathNotFound {
            correspondence_id: correspondence_id.to_string(),
            side: side.as_str(),
            node_id: node_id.to_string(),
        }),
        1 => Ok(paths.into_iter().next().unwrap_or_default()),
        _ => Err(CompileError::DuplicatePath {
            correspondence_id: correspondence_id.to_string(),
            side: side.as_str(),
            node_id: node_id.to_string(),
            paths: paths.iter().map(|p| format!("'{}'", p)).join(", "),
        }),
    }
}
