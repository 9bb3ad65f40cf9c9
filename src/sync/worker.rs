use super::apply::ValueSource;
use super::params::resolve_parameters;
use super::session::{SessionShared, SessionState};
use crate::client::{ApiClient, BODY, TransformRegistry};
use crate::connection::Connection;
use crate::error::{ResolutionError, SyncError};
use crate::mapping::{Endpoint, EndpointMapping, ResolvedEndpoint, VariableValue};
use crate::store::{CacheStore, ConfigStore};
use serde_json::{Value, json};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Granularity at which a sleeping worker checks its stop flag.
const SLEEP_SLICE: Duration = Duration::from_millis(25);

/// The background loop of one connection.
pub(crate) struct Worker {
    pub(crate) shared: Arc<SessionShared>,
    pub(crate) store: Arc<dyn ConfigStore>,
    pub(crate) client: Arc<dyn ApiClient>,
    pub(crate) transforms: Arc<dyn TransformRegistry>,
    pub(crate) cache: Arc<dyn CacheStore>,
    pub(crate) poll_interval: Duration,
}

impl Worker {
    pub(crate) fn run(self) {
        let connection_id = self.shared.connection_id.clone();
        loop {
            if self.shared.stop_requested() {
                break;
            }

            if let Err(e) = self.cycle() {
                error!(connection_id = %connection_id, error = %e, "Sync cycle failed");
                self.shared.log.error(format!("Sync cycle failed: {}", e));
                self.emergency_stop();
                break;
            }

            if !self.sleep() {
                break;
            }
        }
        debug!(connection_id = %connection_id, "Worker exited");
    }

    /// Stops the session from inside the worker, without a grace period.
    /// The log is complete by the time the state reads `Stopped`.
    fn emergency_stop(&self) {
        if self.shared.state() == SessionState::Stopped {
            return;
        }
        self.shared
            .log
            .info("Emergency stop: synchronization halted");
        info!(connection_id = %self.shared.connection_id, "Emergency stop");
        self.shared.finish(self.cache.as_ref());
    }

    /// Sleeps for the poll interval. Returns `false` if a stop was requested.
    fn sleep(&self) -> bool {
        let deadline = Instant::now() + self.poll_interval;
        loop {
            if self.shared.stop_requested() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }

    /// One pass over every complete mapping of the connection, in order.
    fn cycle(&self) -> Result<(), SyncError> {
        let mut connection = self.store.connection(&self.shared.connection_id)?;
        let mappings: Vec<EndpointMapping> = connection
            .endpoint_mappings
            .iter()
            .filter(|m| m.complete && !m.recommendation)
            .cloned()
            .collect();

        for mapping in &mappings {
            if self.shared.stop_requested() {
                break;
            }
            self.process(&mut connection, mapping)?;
        }
        Ok(())
    }

    fn process(&self, connection: &mut Connection, mapping: &EndpointMapping) -> Result<(), SyncError> {
        let compiled = mapping
            .compiled
            .as_ref()
            .ok_or_else(|| ResolutionError::MissingPlan(mapping.id.clone()))?;
        let variables = connection.variable_context();

        let response = match &mapping.source {
            Endpoint::Variables => json!({ "variables": variables }),
            Endpoint::Operation(op) => {
                let values = ValueSource {
                    compiled,
                    variables: &variables,
                    response: None,
                    transforms: self.transforms.as_ref(),
                };
                let kwargs = resolve_parameters(&values, true, &op.parameters)?;
                self.client
                    .call(&op.application_id, &op.function_name(), &kwargs)?
            }
        };

        // A stop raised during the source call drops the response unsent.
        if self.shared.stop_requested() {
            return Ok(());
        }

        if !self.has_changed(&mapping.id, &response) {
            self.shared.log.info(format!(
                "Nothing changed on endpoint: {}, waiting {} seconds",
                mapping.source,
                self.poll_interval.as_secs()
            ));
            return Ok(());
        }

        let values = ValueSource {
            compiled,
            variables: &variables,
            response: Some(&response),
            transforms: self.transforms.as_ref(),
        };

        match &mapping.target {
            Endpoint::Variables => {
                let mut updates = Vec::new();
                for rc in &compiled.resolved {
                    if let ResolvedEndpoint::Variable { name } = &rc.target {
                        let value = values.resolve(&rc.value_locator())?;
                        updates.push((name.clone(), value));
                    }
                }
                for (name, value) in &updates {
                    connection
                        .set_variable(name, VariableValue::from_json(value))
                        .map_err(|_| ResolutionError::UnknownVariable(name.clone()))?;
                }
                self.store.update_connection(connection)?;
                self.shared.log.info(format!(
                    "Updated {} variable(s) from {}",
                    updates.len(),
                    mapping.source
                ));
            }
            Endpoint::Operation(op) => {
                let body = match &compiled.plan {
                    Some(plan) => values.fill(plan)?,
                    None => Value::Null,
                };
                let mut kwargs = resolve_parameters(&values, false, &op.parameters)?;
                if !body.is_null() {
                    kwargs.insert(BODY.to_string(), body);
                }
                self.client
                    .call(&op.application_id, &op.function_name(), &kwargs)?;
                self.shared
                    .log
                    .info(format!("Sent update from {} to {}", mapping.source, mapping.target));
            }
        }
        Ok(())
    }

    /// Compares the serialized response with the cached one. The first
    /// response of a mapping always counts as a change.
    fn has_changed(&self, mapping_id: &str, response: &Value) -> bool {
        let bytes = response.to_string().into_bytes();
        let connection_id = &self.shared.connection_id;
        match self.cache.get(connection_id, mapping_id) {
            Some(previous) if previous == bytes => false,
            _ => {
                self.cache.put(connection_id, mapping_id, bytes);
                true
            }
        }
    }
}
