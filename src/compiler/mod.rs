//! Compiles an endpoint mapping into an executable fill plan.
//!
//! Compilation classifies the mapping, resolves the role of every
//! correspondence endpoint, locates body fields by dotted path, fills a
//! skeleton of the target body and reports what is still unmapped. Any
//! resolution failure aborts the whole mapping.

use crate::error::CompileError;
use crate::mapping::{
    CompiledMapping, EndpointMapping, FillPlan, Locator, MappingKind, ResolvedCorrespondence,
    ResolvedEndpoint, Variable,
};
use tracing::{debug, warn};

mod completeness;
mod paths;
mod roles;
mod skeleton;

use roles::RoleResolver;
use skeleton::skeleton;

/// Which end of a correspondence is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Source,
    Target,
}

impl Side {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Target => "target",
        }
    }
}

pub struct Compiler<'a> {
    connection_id: &'a str,
    mapping: &'a EndpointMapping,
    variables: &'a [Variable],
}

pub struct CompilerBuilder<'a> {
    connection_id: &'a str,
    mapping: &'a EndpointMapping,
    variables: &'a [Variable],
}

impl<'a> CompilerBuilder<'a> {
    pub fn new(connection_id: &'a str, mapping: &'a EndpointMapping) -> Self {
        Self {
            connection_id,
            mapping,
            variables: &[],
        }
    }

    /// The connection's variables, used to resolve variable endpoints.
    pub fn with_variables(mut self, variables: &'a [Variable]) -> Self {
        self.variables = variables;
        self
    }

    pub fn build(self) -> Compiler<'a> {
        Compiler {
            connection_id: self.connection_id,
            mapping: self.mapping,
            variables: self.variables,
        }
    }
}

impl<'a> Compiler<'a> {
    pub fn builder(connection_id: &'a str, mapping: &'a EndpointMapping) -> CompilerBuilder<'a> {
        CompilerBuilder::new(connection_id, mapping)
    }

    /// Classifies the mapping by its target and correspondences.
    pub fn classify(mapping: &EndpointMapping) -> MappingKind {
        if mapping.target.is_variables() {
            MappingKind::VariableTarget
        } else if mapping.correspondences.iter().any(|c| c.function_id().is_some()) {
            MappingKind::ExternalTransform
        } else {
            MappingKind::DirectSchema
        }
    }

    pub fn compile(&self) -> Result<CompiledMapping, CompileError> {
        let result = self.compile_inner();
        match &result {
            Ok(compiled) => debug!(
                connection_id = self.connection_id,
                mapping_id = %self.mapping.id,
                kind = ?compiled.kind,
                complete = compiled.complete,
                "Compiled endpoint mapping"
            ),
            Err(e) => warn!(
                connection_id = self.connection_id,
                mapping_id = %self.mapping.id,
                correspondence_id = e.correspondence_id(),
                error = %e,
                "Endpoint mapping failed to compile"
            ),
        }
        result
    }

    fn compile_inner(&self) -> Result<CompiledMapping, CompileError> {
        let mapping = self.mapping;
        let kind = Self::classify(mapping);

        let resolver = RoleResolver::new(&mapping.source, &mapping.target, self.variables);
        let resolved = mapping
            .correspondences
            .iter()
            .map(|c| -> Result<ResolvedCorrespondence, CompileError> {
                Ok(ResolvedCorrespondence {
                    correspondence_id: c.id.clone(),
                    source: resolver.resolve(&c.id, &c.source, Side::Source)?,
                    target: resolver.resolve(&c.id, &c.target, Side::Target)?,
                    function_id: c.function_id().map(str::to_string),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut incomplete_reasons = Vec::new();
        let plan = match kind {
            MappingKind::DirectSchema => {
                let plan = self.fill_plan(&resolved)?;
                incomplete_reasons.extend(completeness::body_reasons(&plan));
                Some(plan)
            }
            MappingKind::ExternalTransform => {
                // The transform produces the whole body.
                let function_id = resolved
                    .iter()
                    .find_map(|rc| rc.function_id.clone())
                    .unwrap_or_default();
                Some(FillPlan::Leaf(Locator::Transform(function_id)))
            }
            MappingKind::VariableTarget => None,
        };

        incomplete_reasons.extend(completeness::parameter_reasons(
            &mapping.source,
            &mapping.target,
            &mapping.correspondences,
        ));

        Ok(CompiledMapping {
            kind,
            plan,
            resolved,
            complete: incomplete_reasons.is_empty(),
            incomplete_reasons,
        })
    }

    /// Builds the target skeleton and places every body-targeted
    /// correspondence in list order, so a later correspondence to the same
    /// field replaces an earlier one.
    fn fill_plan(&self, resolved: &[ResolvedCorrespondence]) -> Result<FillPlan, CompileError> {
        let mut plan = match self.mapping.target.as_operation() {
            Some(op) => skeleton(&op.schema),
            None => FillPlan::Empty,
        };

        for rc in resolved {
            let ResolvedEndpoint::Schema { path } = &rc.target else {
                continue;
            };
            if !plan.set(path, rc.source.locator()) {
                return Err(CompileError::InvalidPlanPath {
                    correspondence_id: rc.correspondence_id.clone(),
                    path: path.clone(),
                });
            }
        }
        Ok(plan)
    }
}
