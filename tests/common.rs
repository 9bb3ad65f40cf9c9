//! Common test utilities: application fixtures, endpoint lookups and a
//! scripted API client.
use apisync::application::Application;
use apisync::error::TransportError;
use apisync::prelude::*;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// The reading side: a small CRM.
///
/// `GET /users` returns one user, `GET /users/{userId}` the same user by id.
#[allow(dead_code)]
pub fn crm_app() -> Application {
    let user = json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "email": {"type": "string"},
            "address": {
                "type": "object",
                "properties": {"city": {"type": "string"}}
            }
        }
    });
    serde_json::from_value(json!({
        "id": "crm",
        "name": "CRM",
        "servers": ["https://crm.example.com"],
        "operations": [
            {"path": "/users", "operation": "get", "responseSchema": user},
            {
                "path": "/users/{userId}",
                "operation": "get",
                "responseSchema": user,
                "parameters": [{"name": "userId", "in": "path", "schema": {"type": "integer"}}]
            }
        ]
    }))
    .unwrap()
}

/// The writing side: a mailing tool.
///
/// `POST /contacts` requires `fullName`; `PUT /lists/{listId}/contacts` also
/// needs its path parameter.
#[allow(dead_code)]
pub fn mail_app() -> Application {
    let contact = json!({
        "type": "object",
        "required": ["fullName"],
        "properties": {
            "fullName": {"type": "string"},
            "mail": {"type": "string"}
        }
    });
    serde_json::from_value(json!({
        "id": "mail",
        "name": "Mailer",
        "servers": ["https://mail.example.com/api"],
        "auth": {"type": "header", "items": [{"name": "X-Api-Key", "value": "secret"}]},
        "operations": [
            {"path": "/contacts", "operation": "post", "requestSchema": contact},
            {
                "path": "/lists/{listId}/contacts",
                "operation": "put",
                "requestSchema": contact,
                "parameters": [{"name": "listId", "in": "path", "schema": {"type": "string"}}]
            }
        ]
    }))
    .unwrap()
}

#[allow(dead_code)]
pub fn users_source() -> OperationEndpoint {
    crm_app().source_endpoint("/users", "get").unwrap()
}

#[allow(dead_code)]
pub fn user_by_id_source() -> OperationEndpoint {
    crm_app().source_endpoint("/users/{userId}", "get").unwrap()
}

#[allow(dead_code)]
pub fn contacts_target() -> OperationEndpoint {
    mail_app().target_endpoint("/contacts", "post").unwrap()
}

#[allow(dead_code)]
pub fn list_contacts_target() -> OperationEndpoint {
    mail_app().target_endpoint("/lists/{listId}/contacts", "put").unwrap()
}

/// Id of the body node called `name`.
#[allow(dead_code)]
pub fn node(endpoint: &OperationEndpoint, name: &str) -> String {
    endpoint
        .schema_nodes
        .iter()
        .find(|n| n.name == name)
        .unwrap_or_else(|| panic!("no node named '{}'", name))
        .id
        .clone()
}

/// Id of the parameter called `name`.
#[allow(dead_code)]
pub fn param(endpoint: &OperationEndpoint, name: &str) -> String {
    endpoint
        .parameters
        .iter()
        .find(|p| p.name == name)
        .unwrap_or_else(|| panic!("no parameter named '{}'", name))
        .id
        .clone()
}

/// `GET /users -> POST /contacts` with `name -> fullName` and `email -> mail`.
#[allow(dead_code)]
pub fn users_to_contacts(id: &str) -> EndpointMapping {
    let source = users_source();
    let target = contacts_target();
    let name = node(&source, "name");
    let email = node(&source, "email");
    let full_name = node(&target, "fullName");
    let mail = node(&target, "mail");
    EndpointMapping::new(id, Endpoint::Operation(source), Endpoint::Operation(target))
        .with_correspondence(Correspondence::direct("e1", name, full_name))
        .with_correspondence(Correspondence::direct("e2", email, mail))
}

/// A saved connection holding `users_to_contacts`.
#[allow(dead_code)]
pub fn complete_connection() -> Connection {
    let mut connection = Connection::new("c1", "CRM to Mailer");
    connection.applications = vec!["crm".into(), "mail".into()];
    connection.endpoint_mappings.push(users_to_contacts("m1"));
    assert!(connection.save_mappings().is_empty());
    assert!(connection.state.is_complete());
    connection
}

#[allow(dead_code)]
pub fn user(name: &str) -> Value {
    json!({
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "address": {"city": "Utrecht"}
    })
}

/// One recorded client call.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Call {
    pub application_id: String,
    pub function_name: String,
    pub kwargs: Kwargs,
}

/// An [`ApiClient`] that answers from per-function response queues and
/// records every call. The last queued response of a function is repeated.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockClient {
    responses: Mutex<HashMap<String, VecDeque<Value>>>,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<Vec<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[allow(dead_code)]
impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, function_name: &str, response: Value) {
        self.responses
            .lock()
            .entry(function_name.to_string())
            .or_default()
            .push_back(response);
    }

    /// Makes every call to `function_name` fail with a 500.
    pub fn fail(&self, function_name: &str) {
        self.failing.lock().push(function_name.to_string());
    }

    /// Makes every call to `function_name` take `delay` before answering.
    pub fn delay(&self, function_name: &str, delay: Duration) {
        self.delays.lock().insert(function_name.to_string(), delay);
    }

    /// The most calls that were ever in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, function_name: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.function_name == function_name)
            .collect()
    }
}

impl ApiClient for MockClient {
    fn call(
        &self,
        application_id: &str,
        function_name: &str,
        kwargs: &Kwargs,
    ) -> std::result::Result<Value, TransportError> {
        self.calls.lock().push(Call {
            application_id: application_id.to_string(),
            function_name: function_name.to_string(),
            kwargs: kwargs.clone(),
        });

        let delay = self.delays.lock().get(function_name).copied();
        if let Some(delay) = delay {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            thread::sleep(delay);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        if self.failing.lock().iter().any(|f| f == function_name) {
            return Err(TransportError::Status {
                url: format!("mock://{}/{}", application_id, function_name),
                status: 500,
            });
        }

        let mut responses = self.responses.lock();
        let response = match responses.get_mut(function_name) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| json!({"ok": true})))
    }
}

/// Engine config with a short stop grace period for tests.
#[allow(dead_code)]
pub fn test_config() -> SyncConfig {
    SyncConfig {
        poll_interval_secs: 0,
        stop_grace_millis: 1000,
        ..SyncConfig::default()
    }
}

/// Poll interval used by sync tests.
#[allow(dead_code)]
pub const TICK: Duration = Duration::from_millis(30);

/// Polls `condition` every few milliseconds until it holds or `timeout`
/// passes. Returns whether it held.
#[allow(dead_code)]
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[allow(dead_code)]
pub fn manager_with(
    store: Arc<MemoryStore>,
    client: Arc<MockClient>,
    transforms: FnTransforms,
    cache: Arc<MemoryCache>,
) -> SessionManager {
    SessionManager::new(store, client, Arc::new(transforms), cache, test_config())
}
