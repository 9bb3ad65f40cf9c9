//! End-to-end tests over real HTTP against a local stub server.
mod common;
use apisync::application::{Application, Auth};
use apisync::error::{StoreError, TransportError};
use common::*;
use apisync::prelude::*;
use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    target: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

type Requests = Arc<Mutex<Vec<Recorded>>>;

/// Serves every request with `respond(method, target)` and records it.
/// Returns the base url.
fn serve<F>(respond: F) -> (String, Requests)
where
    F: Fn(&str, &str) -> (u16, Value) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let requests: Requests = Arc::default();
    let recorded = Arc::clone(&requests);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let target = parts.next().unwrap_or_default().to_string();

            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    headers.push((name.trim().to_string(), value.trim().to_string()));
                }
            }
            let length = headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.parse::<usize>().ok())
                .unwrap_or(0);
            let mut body = vec![0; length];
            reader.read_exact(&mut body).unwrap();

            let (status, payload) = respond(&method, &target);
            recorded.lock().push(Recorded {
                method,
                target,
                headers,
                body: String::from_utf8_lossy(&body).into_owned(),
            });

            let payload = payload.to_string();
            let response = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                payload.len(),
                payload
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
    });

    (base, requests)
}

fn with_server(mut application: Application, base: &str) -> Application {
    application.servers = vec![base.to_string()];
    application
}

fn requests_of(requests: &Requests, method: &str) -> Vec<Recorded> {
    requests
        .lock()
        .iter()
        .filter(|r| r.method == method)
        .cloned()
        .collect()
}

#[test]
fn test_http_client_substitutes_path_and_sends_auth() {
    let (base, requests) = serve(|_, _| (200, user("Ann")));
    let client = HttpClient::new(
        vec![with_server(crm_app(), &base), with_server(mail_app(), &base)],
        Duration::from_secs(5),
    )
    .unwrap();

    let kwargs: Kwargs = json!({"userId": 7, "expand": "address"})
        .as_object()
        .cloned()
        .unwrap();
    let response = client.call("crm", "users_user_id_get", &kwargs).unwrap();
    assert_eq!(response, user("Ann"));

    let body: Kwargs = json!({"body": {"fullName": "Ann"}}).as_object().cloned().unwrap();
    client.call("mail", "contacts_post", &body).unwrap();

    let gets = requests_of(&requests, "GET");
    assert_eq!(gets[0].target, "/users/7?expand=address");
    assert_eq!(gets[0].header("x-api-key"), None);

    let posts = requests_of(&requests, "POST");
    assert_eq!(posts[0].target, "/contacts");
    assert_eq!(posts[0].header("x-api-key"), Some("secret"));
    let sent: Value = serde_json::from_str(&posts[0].body).unwrap();
    assert_eq!(sent, json!({"fullName": "Ann"}));
}

#[test]
fn test_http_client_basic_auth_and_errors() {
    let (base, requests) = serve(|_, target| {
        if target.starts_with("/users") {
            (503, json!({"error": "down"}))
        } else {
            (200, Value::Null)
        }
    });
    let mut crm = with_server(crm_app(), &base);
    crm.auth = Auth::Basic {
        username: "user".into(),
        password: "pass".into(),
    };
    let client = HttpClient::new(vec![crm], Duration::from_secs(5)).unwrap();

    match client.call("crm", "users_get", &Kwargs::new()) {
        Err(TransportError::Status { status, .. }) => assert_eq!(status, 503),
        other => panic!("Expected a status error, got {:?}", other),
    }
    assert_eq!(
        requests_of(&requests, "GET")[0].header("authorization"),
        Some("Basic dXNlcjpwYXNz")
    );
    assert!(matches!(
        client.call("crm", "nothing_get", &Kwargs::new()),
        Err(TransportError::UnknownFunction { .. })
    ));
}

#[test]
fn test_http_client_for_connection_reads_applications_from_store() {
    let (base, requests) = serve(|_, _| (200, user("Ann")));
    let connection = complete_connection();
    assert_eq!(connection.application_ids(), vec!["crm", "mail"]);

    let partial = MemoryStore::new().with_application(with_server(crm_app(), &base));
    assert!(matches!(
        HttpClient::for_connection(&partial, &connection, Duration::from_secs(5)),
        Err(SyncError::Store(StoreError::ApplicationNotFound(id))) if id == "mail"
    ));

    let store = partial.with_application(with_server(mail_app(), &base));
    let client = HttpClient::for_connection(&store, &connection, Duration::from_secs(5)).unwrap();
    assert_eq!(client.call("crm", "users_get", &Kwargs::new()).unwrap(), user("Ann"));
    assert_eq!(requests_of(&requests, "GET")[0].target, "/users");
}

#[test]
fn test_session_over_http() {
    let (base, requests) = serve(|method, _| match method {
        "GET" => (200, user("Ann")),
        _ => (201, json!({"id": 1})),
    });
    let applications = vec![with_server(crm_app(), &base), with_server(mail_app(), &base)];

    // Connection documents travel as JSON.
    let text = serde_json::to_string(&complete_connection()).unwrap();
    let connection: Connection = serde_json::from_str(&text).unwrap();

    let manager = SessionManager::new(
        Arc::new(MemoryStore::new().with_connection(connection)),
        Arc::new(HttpClient::new(applications, Duration::from_secs(5)).unwrap()),
        Arc::new(FnTransforms::new()),
        Arc::new(MemoryCache::new()),
        test_config(),
    );
    manager.start("c1", TICK, true).unwrap();
    assert!(wait_until(Duration::from_secs(10), || requests_of(&requests, "GET").len() >= 2));
    manager.stop("c1").unwrap();

    let posts = requests_of(&requests, "POST");
    assert_eq!(posts.len(), 1);
    let sent: Value = serde_json::from_str(&posts[0].body).unwrap();
    assert_eq!(sent, json!({"fullName": "Ann", "mail": "ann@example.com"}));
    assert!(manager.log("c1").unwrap().errors().is_empty());
}
