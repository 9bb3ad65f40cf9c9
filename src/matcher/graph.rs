use super::preprocess::preprocess;
use crate::schema::NodeType;
use serde_json::Value;

/// A named attribute of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Preprocessed name used for semantic matching.
    pub name: String,
    pub raw_name: String,
    pub node_type: NodeType,
    pub level: usize,
    /// Index of the containing attribute; `None` directly under the root.
    pub parent: Option<usize>,
}

/// Attributes of a schema with container-to-child edges. Arrays connect
/// straight to the properties of their item; the unnamed root is implicit.
#[derive(Debug, Clone, Default)]
pub struct AttributeGraph {
    pub attributes: Vec<Attribute>,
}

impl AttributeGraph {
    pub fn from_schema(schema: &Value) -> Self {
        let mut graph = Self::default();
        graph.add_children(schema, None, 1);
        graph
    }

    fn add_children(&mut self, schema: &Value, parent: Option<usize>, level: usize) {
        match NodeType::of(schema) {
            NodeType::Object => {
                let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
                    return;
                };
                for (name, child) in properties {
                    let index = self.attributes.len();
                    self.attributes.push(Attribute {
                        name: preprocess(name),
                        raw_name: name.clone(),
                        node_type: NodeType::of(child),
                        level,
                        parent,
                    });
                    self.add_children(child, Some(index), level + 1);
                }
            }
            NodeType::Array => {
                if let Some(items) = schema.get("items") {
                    self.add_children(items, parent, level);
                }
            }
            _ => {}
        }
    }

    /// Attributes that are compared: everything but objects.
    pub fn leaves(&self) -> impl Iterator<Item = (usize, &Attribute)> {
        self.attributes
            .iter()
            .enumerate()
            .filter(|(_, a)| a.node_type != NodeType::Object)
    }

    /// The nearest ancestor with a non-empty preprocessed name.
    pub fn named_ancestor(&self, index: usize) -> Option<&Attribute> {
        let mut current = self.attributes.get(index)?.parent;
        while let Some(i) = current {
            let attribute = self.attributes.get(i)?;
            if !attribute.name.is_empty() {
                return Some(attribute);
            }
            current = attribute.parent;
        }
        None
    }
}
