use super::definition::{IncompleteReason, MappingKind};
use super::plan::{FillPlan, Locator};
use crate::error::ArtifactError;
use crate::schema::ParameterLocation;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

/// The role a correspondence endpoint resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolvedEndpoint {
    /// A body field at a dotted path.
    Schema { path: String },
    SourceParameter {
        name: String,
        location: ParameterLocation,
    },
    TargetParameter {
        name: String,
        location: ParameterLocation,
    },
    Variable { name: String },
}

impl ResolvedEndpoint {
    /// Locator reading this endpoint when it is the source of a correspondence.
    pub fn locator(&self) -> Locator {
        match self {
            ResolvedEndpoint::Schema { path } => Locator::Source(path.clone()),
            ResolvedEndpoint::SourceParameter { name, .. } => Locator::SourceParameter(name.clone()),
            ResolvedEndpoint::TargetParameter { name, .. } => Locator::TargetParameter(name.clone()),
            ResolvedEndpoint::Variable { name } => Locator::Variable(name.clone()),
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            ResolvedEndpoint::Schema { .. } => "schema",
            ResolvedEndpoint::SourceParameter { .. } => "source parameter",
            ResolvedEndpoint::TargetParameter { .. } => "target parameter",
            ResolvedEndpoint::Variable { .. } => "variable",
        }
    }
}

/// A correspondence with both ends resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCorrespondence {
    pub correspondence_id: String,
    pub source: ResolvedEndpoint,
    pub target: ResolvedEndpoint,
    pub function_id: Option<String>,
}

impl ResolvedCorrespondence {
    /// Locator producing the value this correspondence delivers.
    pub fn value_locator(&self) -> Locator {
        match &self.function_id {
            Some(function_id) => Locator::Transform(function_id.clone()),
            None => self.source.locator(),
        }
    }
}

/// The executable result of compiling one endpoint mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledMapping {
    pub kind: MappingKind,
    /// `None` for mappings that write into variables.
    pub plan: Option<FillPlan>,
    pub resolved: Vec<ResolvedCorrespondence>,
    pub complete: bool,
    pub incomplete_reasons: Vec<IncompleteReason>,
}

impl CompiledMapping {
    /// The correspondence delivering the named source or target parameter.
    pub fn parameter_feed(&self, source_side: bool, name: &str) -> Option<&ResolvedCorrespondence> {
        self.resolved.iter().rev().find(|rc| match &rc.target {
            ResolvedEndpoint::SourceParameter { name: n, .. } => source_side && n == name,
            ResolvedEndpoint::TargetParameter { name: n, .. } => !source_side && n == name,
            _ => false,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        encode_to_vec(self, standard())
            .map_err(|e| ArtifactError::Generic(format!("Serialization failed: {}", e)))
    }

    /// Saves the compiled mapping to a file using the bincode format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|e| {
            ArtifactError::Generic(format!("Could not create file '{}': {}", path.display(), e))
        })?;
        file.write_all(&bytes).map_err(|e| {
            ArtifactError::Generic(format!("Could not write to file '{}': {}", path.display(), e))
        })?;
        Ok(())
    }

    /// Loads a compiled mapping from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let mut file = fs::File::open(path).map_err(|e| {
            ArtifactError::Generic(format!("Could not open file '{}': {}", path.display(), e))
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| {
            ArtifactError::Generic(format!("Could not read from file '{}': {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        decode_from_slice(bytes, standard())
            .map(|(compiled, _)| compiled)
            .map_err(|e| ArtifactError::Generic(format!("Deserialization failed: {}", e)))
    }
}
