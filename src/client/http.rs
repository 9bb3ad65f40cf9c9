use super::{ApiClient, BODY, Kwargs};
use crate::application::{Application, Auth};
use crate::connection::Connection;
use crate::error::{SyncError, TransportError};
use crate::store::ConfigStore;
use ahash::AHashMap;
use reqwest::blocking::Client;
use reqwest::{Method, header};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Blocking HTTP client driven by application documents.
///
/// Function names resolve to operations through the same naming rule the
/// engine uses. Keyword arguments whose name appears as `{name}` in the path
/// template are substituted into the path; the others become query
/// parameters.
pub struct HttpClient {
    client: Client,
    applications: AHashMap<String, Application>,
}

impl HttpClient {
    pub fn new(applications: Vec<Application>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request {
                url: String::new(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            applications: applications
                .into_iter()
                .map(|app| (app.id.clone(), app))
                .collect(),
        })
    }

    /// Builds a client for every application `connection` uses, read from
    /// `store`.
    pub fn for_connection(
        store: &dyn ConfigStore,
        connection: &Connection,
        timeout: Duration,
    ) -> Result<Self, SyncError> {
        let applications = connection
            .application_ids()
            .iter()
            .map(|id| store.application(id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(applications, timeout)?)
    }

    fn value_text(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Splits keyword arguments into the concrete path and the query pairs.
    fn expand_path(template: &str, kwargs: &Kwargs) -> (String, Vec<(String, String)>) {
        let mut path = template.to_string();
        let mut query = Vec::new();
        for (name, value) in kwargs {
            if name == BODY {
                continue;
            }
            let placeholder = format!("{{{}}}", name);
            if path.contains(&placeholder) {
                path = path.replace(&placeholder, &Self::value_text(value));
            } else {
                query.push((name.clone(), Self::value_text(value)));
            }
        }
        (path, query)
    }
}

impl ApiClient for HttpClient {
    fn call(
        &self,
        application_id: &str,
        function_name: &str,
        kwargs: &Kwargs,
    ) -> Result<Value, TransportError> {
        let app = self
            .applications
            .get(application_id)
            .ok_or_else(|| TransportError::UnknownApplication(application_id.to_string()))?;
        let operation = app
            .function(function_name)
            .ok_or_else(|| TransportError::UnknownFunction {
                application_id: application_id.to_string(),
                function: function_name.to_string(),
            })?;
        let server = app
            .servers
            .first()
            .ok_or_else(|| TransportError::NoServer(application_id.to_string()))?;

        let (path, query) = Self::expand_path(&operation.path, kwargs);
        let url = format!("{}{}", server.trim_end_matches('/'), path);
        let method = Method::from_bytes(operation.operation.to_uppercase().as_bytes()).map_err(
            |e| TransportError::Request {
                url: url.clone(),
                message: e.to_string(),
            },
        )?;

        let mut request = self
            .client
            .request(method.clone(), &url)
            .query(&query)
            .header(header::ACCEPT, "application/json");
        request = match &app.auth {
            Auth::None => request,
            Auth::Header { items } => items
                .iter()
                .fold(request, |req, item| req.header(&item.name, &item.value)),
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
        };
        if let Some(body) = kwargs.get(BODY) {
            request = request.json(body);
        }

        debug!(%method, %url, "Calling endpoint");
        let response = request.send().map_err(|e| TransportError::Request {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let text = response.text().map_err(|e| TransportError::Decode {
            url: url.clone(),
            message: e.to_string(),
        })?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| TransportError::Decode {
            url,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expand_path_splits_path_and_query() {
        let kwargs: Kwargs = json!({"userId": 7, "limit": "10", "body": {"a": 1}})
            .as_object()
            .cloned()
            .unwrap();
        let (path, query) = HttpClient::expand_path("/users/{userId}", &kwargs);
        assert_eq!(path, "/users/7");
        assert_eq!(query, vec![("limit".to_string(), "10".to_string())]);
    }

    #[test]
    fn test_unknown_application() {
        let client = HttpClient::new(Vec::new(), Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.call("crm", "users_get", &Kwargs::new()),
            Err(TransportError::UnknownApplication("crm".into()))
        );
    }
}
