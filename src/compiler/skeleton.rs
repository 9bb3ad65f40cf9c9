use crate::mapping::FillPlan;
use crate::schema::{NodeType, is_open_object};
use serde_json::Value;

/// Builds an empty fill plan mirroring `schema`.
///
/// Objects recurse per property, arrays are unwrapped to their item and every
/// other schema becomes an empty leaf. An object without properties becomes
/// an open slot that may be filled but is never required.
pub(super) fn skeleton(schema: &Value) -> FillPlan {
    if is_open_object(schema) {
        return FillPlan::Open;
    }
    match NodeType::of(schema) {
        NodeType::Object => match schema.get("properties").and_then(Value::as_object) {
            Some(properties) => FillPlan::Object(
                properties
                    .iter()
                    .map(|(name, child)| (name.clone(), skeleton(child)))
                    .collect(),
            ),
            None => FillPlan::Open,
        },
        NodeType::Array => match schema.get("items") {
            Some(items) => skeleton(items),
            None => FillPlan::Empty,
        },
        _ => FillPlan::Empty,
    }
}
