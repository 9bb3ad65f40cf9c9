use super::id::{node_id, property_segment, ITEMS_SEGMENT};
use super::node::{NodeType, ParentKind, SchemaNode, is_open_object};
use serde_json::Value;

/// Name given to the synthetic node that stands for every element of an array.
pub const ARRAY_ITEM: &str = "array-item";

/// A node met during a depth-first walk of a nested schema.
struct Visit<'a> {
    schema: &'a Value,
    pointer: String,
    /// Dotted property path; array levels add no segment.
    path: String,
    name: String,
    parent_id: Option<String>,
    parent_kind: ParentKind,
    in_array: bool,
    required: bool,
}

/// Walks `schema` depth-first and calls `visit` for every node, parents
/// before children. Subschemas using `oneOf` or `anyOf` are skipped along
/// with everything below them.
fn walk<F>(schema: &Value, namespace: &str, for_target: bool, mut visit: F)
where
    F: FnMut(&Visit, &str, NodeType),
{
    let root_type = NodeType::of(schema);
    let root = Visit {
        schema,
        pointer: String::new(),
        path: String::new(),
        name: root_type.as_str().to_string(),
        parent_id: None,
        parent_kind: ParentKind::None,
        in_array: false,
        required: false,
    };
    walk_node(root, namespace, for_target, &mut visit);
}

fn walk_node<F>(node: Visit, namespace: &str, for_target: bool, visit: &mut F)
where
    F: FnMut(&Visit, &str, NodeType),
{
    let Some(object) = node.schema.as_object() else {
        return;
    };
    if object.contains_key("oneOf") || object.contains_key("anyOf") {
        return;
    }

    let id = node_id(namespace, &node.pointer);
    let node_type = NodeType::of(node.schema);
    visit(&node, &id, node_type);

    match node_type {
        NodeType::Object => {
            let Some(properties) = object.get("properties").and_then(Value::as_object) else {
                return;
            };
            let required: Vec<&str> = object
                .get("required")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            for (name, child) in properties {
                let path = if node.path.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{}", node.path, name)
                };
                let child = Visit {
                    schema: child,
                    pointer: format!("{}{}", node.pointer, property_segment(name)),
                    path,
                    name: name.clone(),
                    parent_id: Some(id.clone()),
                    parent_kind: ParentKind::Object,
                    in_array: node.in_array,
                    required: for_target && required.contains(&name.as_str()),
                };
                walk_node(child, namespace, for_target, visit);
            }
        }
        NodeType::Array => {
            let Some(items) = object.get("items") else {
                return;
            };
            let child = Visit {
                schema: items,
                pointer: format!("{}{}", node.pointer, ITEMS_SEGMENT),
                path: node.path.clone(),
                name: ARRAY_ITEM.to_string(),
                parent_id: Some(id.clone()),
                parent_kind: ParentKind::Array,
                in_array: true,
                required: false,
            };
            walk_node(child, namespace, for_target, visit);
        }
        _ => {}
    }
}

/// Flattens a JSON Schema fragment into its addressable nodes.
///
/// `namespace` keeps ids of different fragments apart; callers use something
/// like `"<application>:<path>:<operation>:response"`. Required-ness is only
/// computed when `for_target` is set, since only target bodies are validated.
pub fn flatten(schema: &Value, namespace: &str, for_target: bool) -> Vec<SchemaNode> {
    let mut nodes = Vec::new();
    walk(schema, namespace, for_target, |visit, id, node_type| {
        nodes.push(SchemaNode {
            id: id.to_string(),
            name: visit.name.clone(),
            node_type,
            parent_id: visit.parent_id.clone(),
            parent_kind: visit.parent_kind,
            in_array: visit.in_array,
            required: visit.required,
        });
    });
    nodes
}

/// Returns the dotted path of every addressable node of `schema` whose id is
/// `id`. Containers are not addressable, except objects without properties;
/// the item of a scalar array is addressed by its array's path.
pub fn locate(schema: &Value, namespace: &str, id: &str) -> Vec<String> {
    let mut paths = Vec::new();
    walk(schema, namespace, false, |visit, node_id, node_type| {
        if node_id == id && (!node_type.is_container() || is_open_object(visit.schema)) {
            paths.push(visit.path.clone());
        }
    });
    paths
}
