//! Connections tie two applications together through endpoint mappings and
//! connection-scoped variables.

use crate::compiler::Compiler;
use crate::error::{CompileError, StoreError};
use crate::mapping::{EndpointMapping, Variable, VariableValue};
use crate::schema::node_id;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::info;

/// Reason reported when a mapping still lacks correspondences.
pub const LOW_LEVEL_INCOMPLETE: &str = "Low level mapping incomplete";

/// Variable set handed to transforms, keyed by variable name.
pub type VariableContext = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason")]
pub enum ConnectionState {
    Complete,
    Incomplete(String),
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Incomplete("Not saved".to_string())
    }
}

impl ConnectionState {
    pub fn is_complete(&self) -> bool {
        matches!(self, ConnectionState::Complete)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Complete => f.write_str("Complete"),
            ConnectionState::Incomplete(reason) => f.write_str(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub applications: Vec<String>,
    #[serde(default)]
    pub endpoint_mappings: Vec<EndpointMapping>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub state: ConnectionState,
}

impl Connection {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            applications: Vec::new(),
            endpoint_mappings: Vec::new(),
            variables: Vec::new(),
            state: ConnectionState::default(),
        }
    }

    /// Compiles every endpoint mapping and refreshes the connection state.
    ///
    /// A mapping that fails to compile loses its previous plan and is left
    /// incomplete; the others are still compiled. The failures are returned
    /// keyed by mapping id.
    pub fn save_mappings(&mut self) -> Vec<(String, CompileError)> {
        let mut failures = Vec::new();
        let compiled: Vec<_> = self
            .endpoint_mappings
            .iter()
            .map(|mapping| {
                Compiler::builder(&self.id, mapping)
                    .with_variables(&self.variables)
                    .build()
                    .compile()
            })
            .collect();

        for (mapping, result) in self.endpoint_mappings.iter_mut().zip(compiled) {
            match result {
                Ok(compiled) => mapping.apply(compiled),
                Err(e) => {
                    mapping.invalidate(&e);
                    failures.push((mapping.id.clone(), e));
                }
            }
        }

        self.update_state();
        info!(
            connection_id = %self.id,
            state = %self.state,
            failures = failures.len(),
            "Saved endpoint mappings"
        );
        failures
    }

    /// `Complete` when every mapping a user has worked on is complete.
    /// Untouched recommendation stubs are ignored.
    pub fn update_state(&mut self) {
        let complete = self
            .endpoint_mappings
            .iter()
            .filter(|m| !m.recommendation)
            .all(|m| m.complete);
        self.state = if complete {
            ConnectionState::Complete
        } else {
            ConnectionState::Incomplete(LOW_LEVEL_INCOMPLETE.to_string())
        };
    }

    /// Names of the mappings that are not complete, e.g.
    /// `GET /users -> POST /contacts`.
    pub fn incomplete_mappings(&self) -> Vec<String> {
        self.endpoint_mappings
            .iter()
            .filter(|m| !m.recommendation && !m.complete)
            .map(EndpointMapping::name)
            .collect()
    }

    /// Ids of every application the connection talks to: the declared ones
    /// first, then any other named by a mapping endpoint.
    pub fn application_ids(&self) -> Vec<String> {
        let declared = self.applications.iter().cloned();
        let used = self
            .endpoint_mappings
            .iter()
            .flat_map(|m| [m.source.as_operation(), m.target.as_operation()])
            .flatten()
            .map(|op| op.application_id.clone());
        declared.chain(used).unique().collect()
    }

    pub fn mapping(&self, id: &str) -> Option<&EndpointMapping> {
        self.endpoint_mappings.iter().find(|m| m.id == id)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Adds a variable from raw user input, sniffing its type. Adding a name
    /// that already exists replaces its value.
    pub fn add_variable(&mut self, name: &str, raw: &str) -> &Variable {
        let value = VariableValue::sniff(raw);
        if let Some(index) = self.variables.iter().position(|v| v.name == name) {
            self.variables[index].set(value);
            return &self.variables[index];
        }
        let id = node_id(&self.id, &format!("/variables/{}", name));
        self.variables.push(Variable::new(id, name, value));
        let last = self.variables.len() - 1;
        &self.variables[last]
    }

    /// Renames a variable and replaces its value from raw user input.
    pub fn update_variable(&mut self, id: &str, name: &str, raw: &str) -> Result<(), StoreError> {
        let variable = self
            .variables
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| StoreError::VariableNotFound {
                connection_id: self.id.clone(),
                variable_id: id.to_string(),
            })?;
        variable.name = name.to_string();
        variable.set(VariableValue::sniff(raw));
        Ok(())
    }

    /// Sets the value of a variable by name.
    pub fn set_variable(&mut self, name: &str, value: VariableValue) -> Result<(), StoreError> {
        let variable = self
            .variables
            .iter_mut()
            .find(|v| v.name == name)
            .ok_or_else(|| StoreError::VariableNotFound {
                connection_id: self.id.clone(),
                variable_id: name.to_string(),
            })?;
        variable.set(value);
        Ok(())
    }

    pub fn delete_variable(&mut self, id: &str) -> Result<Variable, StoreError> {
        let index = self
            .variables
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| StoreError::VariableNotFound {
                connection_id: self.id.clone(),
                variable_id: id.to_string(),
            })?;
        Ok(self.variables.remove(index))
    }

    /// Snapshot of every variable as plain JSON, keyed by name.
    pub fn variable_context(&self) -> VariableContext {
        self.variables
            .iter()
            .map(|v| (v.name.clone(), v.value.to_json()))
            .collect()
    }
}

/// Name of the generated client function for an operation.
///
/// Camel case is folded to snake case, slashes become underscores, path
/// parameter braces are dropped and the operation is appended:
/// `("/users/{userId}", "get")` gives `users_user_id_get`.
pub fn function_name(path: &str, operation: &str) -> String {
    let mut snake = String::with_capacity(path.len() + operation.len() + 4);
    let mut previous_upper = false;
    for (i, c) in path.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 && !previous_upper {
                snake.push('_');
            }
            snake.push(c.to_ascii_lowercase());
            previous_upper = true;
            continue;
        }
        previous_upper = false;
        match c {
            '/' => snake.push('_'),
            '{' | '}' => {}
            other => snake.push(other.to_ascii_lowercase()),
        }
    }
    if !snake.ends_with('_') {
        snake.push('_');
    }
    snake.push_str(&operation.to_lowercase());
    snake.trim_start_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_name() {
        assert_eq!(function_name("/users/{userId}", "get"), "users_user_id_get");
        assert_eq!(function_name("/contacts", "post"), "contacts_post");
        assert_eq!(function_name("/contacts/", "PUT"), "contacts_put");
        assert_eq!(function_name("/getHTTPStatus", "get"), "get_httpstatus_get");
    }

    #[test]
    fn test_variable_lifecycle() {
        let mut connection = Connection::new("c1", "demo");
        let id = connection.add_variable("limit", "10").id.clone();
        assert_eq!(connection.variable("limit").unwrap().declared_type, "number");

        connection.update_variable(&id, "pageSize", "'10'").unwrap();
        assert_eq!(
            connection.variable("pageSize").unwrap().value,
            VariableValue::String("10".into())
        );

        connection.set_variable("pageSize", VariableValue::Bool(true)).unwrap();
        assert_eq!(connection.variable_context()["pageSize"], Value::Bool(true));

        connection.delete_variable(&id).unwrap();
        assert!(connection.variables.is_empty());
        assert!(connection.delete_variable(&id).is_err());
    }
}
