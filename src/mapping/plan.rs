use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

const SOURCE_PARAMETER: &str = "sourceParameter.";
const TARGET_PARAMETER: &str = "targetParameter.";
const VARIABLES: &str = "variables.";
const TRANSFORM: &str = "transform.";

/// Where the value of a fill plan leaf comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locator {
    /// Dotted path into the source response.
    Source(String),
    SourceParameter(String),
    TargetParameter(String),
    Variable(String),
    /// The value is produced by a transform function.
    Transform(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Source(path) => f.write_str(path),
            Locator::SourceParameter(name) => write!(f, "{}{}", SOURCE_PARAMETER, name),
            Locator::TargetParameter(name) => write!(f, "{}{}", TARGET_PARAMETER, name),
            Locator::Variable(name) => write!(f, "{}{}", VARIABLES, name),
            Locator::Transform(id) => write!(f, "{}{}", TRANSFORM, id),
        }
    }
}

impl FromStr for Locator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let locator = if let Some(name) = s.strip_prefix(SOURCE_PARAMETER) {
            Locator::SourceParameter(name.to_string())
        } else if let Some(name) = s.strip_prefix(TARGET_PARAMETER) {
            Locator::TargetParameter(name.to_string())
        } else if let Some(name) = s.strip_prefix(VARIABLES) {
            Locator::Variable(name.to_string())
        } else if let Some(id) = s.strip_prefix(TRANSFORM) {
            Locator::Transform(id.to_string())
        } else {
            Locator::Source(s.to_string())
        };
        Ok(locator)
    }
}

/// The compiled shape of a target body.
///
/// Objects keep their fields in schema order. Arrays are unwrapped to a
/// single representative element, so an array of objects appears here as
/// the object itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FillPlan {
    Object(Vec<(String, FillPlan)>),
    Leaf(Locator),
    Empty,
    /// An unfilled free-form object. Optional, and left out of the body.
    Open,
}

impl FillPlan {
    /// Places `locator` at the dotted `path`. An existing leaf is overwritten.
    /// Returns `false` when the path does not lead to a leaf slot.
    pub fn set(&mut self, path: &str, locator: Locator) -> bool {
        if path.is_empty() {
            return match self {
                FillPlan::Object(_) => false,
                slot => {
                    *slot = FillPlan::Leaf(locator);
                    true
                }
            };
        }

        let mut current = self;
        for segment in path.split('.') {
            let FillPlan::Object(fields) = current else {
                return false;
            };
            match fields.iter_mut().find(|(name, _)| name == segment) {
                Some((_, child)) => current = child,
                None => return false,
            }
        }
        match current {
            FillPlan::Object(_) => false,
            slot => {
                *slot = FillPlan::Leaf(locator);
                true
            }
        }
    }

    /// Dotted paths of every leaf that has no locator yet.
    pub fn empty_leaves(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_empty("", &mut out);
        out
    }

    fn collect_empty(&self, prefix: &str, out: &mut Vec<String>) {
        match self {
            FillPlan::Empty => out.push(prefix.to_string()),
            FillPlan::Leaf(_) | FillPlan::Open => {}
            FillPlan::Object(fields) => {
                for (name, child) in fields {
                    let path = if prefix.is_empty() {
                        name.clone()
                    } else {
                        format!("{}.{}", prefix, name)
                    };
                    child.collect_empty(&path, out);
                }
            }
        }
    }

    /// Walks every leaf locator in plan order.
    pub fn locators(&self) -> Vec<&Locator> {
        match self {
            FillPlan::Empty | FillPlan::Open => Vec::new(),
            FillPlan::Leaf(locator) => vec![locator],
            FillPlan::Object(fields) => fields.iter().flat_map(|(_, c)| c.locators()).collect(),
        }
    }

    /// Renders the plan as JSON with locators in their string form, empty
    /// leaves as `""` and open slots as `null`.
    pub fn to_json(&self) -> Value {
        match self {
            FillPlan::Empty => Value::String(String::new()),
            FillPlan::Open => Value::Null,
            FillPlan::Leaf(locator) => Value::String(locator.to_string()),
            FillPlan::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, child)| (name.clone(), child.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}
