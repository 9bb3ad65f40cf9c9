use crate::client::TransformRegistry;
use crate::connection::VariableContext;
use crate::error::{ResolutionError, SyncError};
use crate::mapping::{CompiledMapping, FillPlan, Locator};
use serde_json::{Map, Value};

/// Parameters may feed each other; deeper chains than this are cycles.
const MAX_DEPTH: usize = 16;

/// Everything a locator can read from during one sync step.
pub(crate) struct ValueSource<'a> {
    pub(crate) compiled: &'a CompiledMapping,
    pub(crate) variables: &'a VariableContext,
    /// The current source response; absent while resolving source parameters.
    pub(crate) response: Option<&'a Value>,
    pub(crate) transforms: &'a dyn TransformRegistry,
}

impl ValueSource<'_> {
    pub(crate) fn resolve(&self, locator: &Locator) -> Result<Value, SyncError> {
        self.resolve_at(locator, 0)
    }

    fn resolve_at(&self, locator: &Locator, depth: usize) -> Result<Value, SyncError> {
        if depth > MAX_DEPTH {
            return Err(ResolutionError::CyclicParameter(locator.to_string()).into());
        }
        match locator {
            Locator::Source(path) => {
                let response = self
                    .response
                    .ok_or_else(|| ResolutionError::NoResponse(path.clone()))?;
                lookup(response, path)
                    .ok_or_else(|| ResolutionError::MissingPath { path: path.clone() }.into())
            }
            Locator::Variable(name) => self
                .variables
                .get(name)
                .cloned()
                .ok_or_else(|| ResolutionError::UnknownVariable(name.clone()).into()),
            Locator::SourceParameter(name) | Locator::TargetParameter(name) => {
                let source_side = matches!(locator, Locator::SourceParameter(_));
                let feed = self
                    .compiled
                    .parameter_feed(source_side, name)
                    .ok_or_else(|| ResolutionError::UnfedParameter(name.clone()))?;
                self.resolve_at(&feed.value_locator(), depth + 1)
            }
            Locator::Transform(function_id) => {
                let source = self.response.unwrap_or(&Value::Null);
                Ok(self.transforms.invoke(function_id, source, self.variables)?)
            }
        }
    }

    /// Materializes a fill plan into a request body.
    pub(crate) fn fill(&self, plan: &FillPlan) -> Result<Value, SyncError> {
        match plan {
            FillPlan::Empty | FillPlan::Open => Ok(Value::Null),
            FillPlan::Leaf(locator) => self.resolve(locator),
            FillPlan::Object(fields) => {
                let mut body = Map::with_capacity(fields.len());
                for (name, child) in fields {
                    if matches!(child, FillPlan::Open) {
                        continue;
                    }
                    body.insert(name.clone(), self.fill(child)?);
                }
                Ok(Value::Object(body))
            }
        }
    }
}

/// Reads a dotted path out of `value`. Numeric segments index arrays; any
/// other segment applied to an array is projected over every element.
pub(crate) fn lookup(value: &Value, path: &str) -> Option<Value> {
    if path.is_empty() {
        return Some(value.clone());
    }
    let segments: Vec<&str> = path.split('.').collect();
    lookup_segments(value, &segments)
}

fn lookup_segments(value: &Value, segments: &[&str]) -> Option<Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value.clone());
    };
    match value {
        Value::Object(fields) => lookup_segments(fields.get(*head)?, rest),
        Value::Array(items) => match head.parse::<usize>() {
            Ok(index) => lookup_segments(items.get(index)?, rest),
            Err(_) => items
                .iter()
                .map(|item| lookup_segments(item, segments))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FnTransforms;
    use crate::mapping::{MappingKind, ResolvedCorrespondence, ResolvedEndpoint};
    use crate::schema::ParameterLocation;
    use serde_json::json;

    fn compiled(resolved: Vec<ResolvedCorrespondence>) -> CompiledMapping {
        CompiledMapping {
            kind: MappingKind::DirectSchema,
            plan: None,
            resolved,
            complete: true,
            incomplete_reasons: Vec::new(),
        }
    }

    #[test]
    fn test_lookup_indexes_and_projects() {
        let value = json!({"users": [{"name": "Ann"}, {"name": "Bob"}], "meta": {"count": 2}});
        assert_eq!(lookup(&value, "meta.count"), Some(json!(2)));
        assert_eq!(lookup(&value, "users.1.name"), Some(json!("Bob")));
        assert_eq!(lookup(&value, "users.name"), Some(json!(["Ann", "Bob"])));
        assert_eq!(lookup(&value, "users.email"), None);
        assert_eq!(lookup(&value, ""), Some(value.clone()));
    }

    #[test]
    fn test_parameter_chains_resolve_through_variables() {
        let compiled = compiled(vec![
            ResolvedCorrespondence {
                correspondence_id: "c1".into(),
                source: ResolvedEndpoint::Variable { name: "org".into() },
                target: ResolvedEndpoint::SourceParameter {
                    name: "orgId".into(),
                    location: ParameterLocation::Path,
                },
                function_id: None,
            },
            ResolvedCorrespondence {
                correspondence_id: "c2".into(),
                source: ResolvedEndpoint::SourceParameter {
                    name: "orgId".into(),
                    location: ParameterLocation::Path,
                },
                target: ResolvedEndpoint::TargetParameter {
                    name: "tenant".into(),
                    location: ParameterLocation::Query,
                },
                function_id: None,
            },
        ]);
        let variables: VariableContext = json!({"org": "acme"}).as_object().cloned().unwrap();
        let transforms = FnTransforms::new();
        let values = ValueSource {
            compiled: &compiled,
            variables: &variables,
            response: None,
            transforms: &transforms,
        };
        assert_eq!(
            values.resolve(&Locator::TargetParameter("tenant".into())),
            Ok(json!("acme"))
        );
        assert_eq!(
            values.resolve(&Locator::Source("id".into())),
            Err(ResolutionError::NoResponse("id".into()).into())
        );
    }

    #[test]
    fn test_cyclic_parameters_are_rejected() {
        let param = |name: &str| ResolvedEndpoint::SourceParameter {
            name: name.into(),
            location: ParameterLocation::Query,
        };
        let compiled = compiled(vec![
            ResolvedCorrespondence {
                correspondence_id: "c1".into(),
                source: param("a"),
                target: param("b"),
                function_id: None,
            },
            ResolvedCorrespondence {
                correspondence_id: "c2".into(),
                source: param("b"),
                target: param("a"),
                function_id: None,
            },
        ]);
        let variables = VariableContext::new();
        let transforms = FnTransforms::new();
        let values = ValueSource {
            compiled: &compiled,
            variables: &variables,
            response: None,
            transforms: &transforms,
        };
        assert!(matches!(
            values.resolve(&Locator::SourceParameter("a".into())),
            Err(SyncError::Resolution(ResolutionError::CyclicParameter(_)))
        ));
    }

    #[test]
    fn test_open_slots_are_left_out_of_the_body() {
        let compiled = compiled(Vec::new());
        let variables = VariableContext::new();
        let transforms = FnTransforms::new();
        let response = json!({"name": "Ann", "settings": {"theme": "dark"}});
        let values = ValueSource {
            compiled: &compiled,
            variables: &variables,
            response: Some(&response),
            transforms: &transforms,
        };

        let unfilled = FillPlan::Object(vec![
            ("fullName".into(), FillPlan::Leaf(Locator::Source("name".into()))),
            ("meta".into(), FillPlan::Open),
        ]);
        assert_eq!(values.fill(&unfilled), Ok(json!({"fullName": "Ann"})));

        let filled = FillPlan::Object(vec![
            ("fullName".into(), FillPlan::Leaf(Locator::Source("name".into()))),
            ("meta".into(), FillPlan::Leaf(Locator::Source("settings".into()))),
        ]);
        assert_eq!(
            values.fill(&filled),
            Ok(json!({"fullName": "Ann", "meta": {"theme": "dark"}}))
        );
    }
}
