use super::paths::resolve_path;
use super::Side;
use crate::error::CompileError;
use crate::mapping::{Endpoint, ResolvedEndpoint, Variable};
use itertools::Itertools;

/// Resolves correspondence endpoint ids to the role they play.
///
/// Lookup order is the endpoint's own body schema, then the source
/// parameters, then the target parameters, then the connection variables.
/// An id found in more than one place is rejected.
pub(super) struct RoleResolver<'a> {
    source: &'a Endpoint,
    target: &'a Endpoint,
    variables: &'a [Variable],
}

impl<'a> RoleResolver<'a> {
    pub(super) fn new(source: &'a Endpoint, target: &'a Endpoint, variables: &'a [Variable]) -> Self {
        Self {
            source,
            target,
            variables,
        }
    }

    pub(super) fn resolve(
        &self,
        correspondence_id: &str,
        node_id: &str,
        side: Side,
    ) -> Result<ResolvedEndpoint, CompileError> {
        let own = match side {
            Side::Source => self.source,
            Side::Target => self.target,
        };

        let mut hits: Vec<&'static str> = Vec::new();
        if own.schema_nodes().iter().any(|n| n.id == node_id) {
            hits.push("schema");
        }
        let source_param = self.source.parameters().iter().find(|p| p.id == node_id);
        if source_param.is_some() {
            hits.push("source parameter");
        }
        let target_param = self.target.parameters().iter().find(|p| p.id == node_id);
        if target_param.is_some() {
            hits.push("target parameter");
        }
        let variable = self.variables.iter().find(|v| v.id == node_id);
        if variable.is_some() {
            hits.push("variable");
        }

        match hits.as_slice() {
            [] => Err(CompileError::UnresolvedNode {
                correspondence_id: correspondence_id.to_string(),
                side: side.as_str(),
                node_id: node_id.to_string(),
            }),
            [_] => {
                if let Some(param) = source_param {
                    return Ok(ResolvedEndpoint::SourceParameter {
                        name: param.name.clone(),
                        location: param.location,
                    });
                }
                if let Some(param) = target_param {
                    return Ok(ResolvedEndpoint::TargetParameter {
                        name: param.name.clone(),
                        location: param.location,
                    });
                }
                if let Some(variable) = variable {
                    return Ok(ResolvedEndpoint::Variable {
                        name: variable.name.clone(),
                    });
                }
                let path = resolve_path(own, correspondence_id, node_id, side)?;
                Ok(ResolvedEndpoint::Schema { path })
            }
            _ => Err(CompileError::AmbiguousNode {
                correspondence_id: correspondence_id.to_string(),
                side: side.as_str(),
                node_id: node_id.to_string(),
                roles: hits.iter().join(", "),
            }),
        }
    }
}
