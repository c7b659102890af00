// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for faking the Kubernetes API and the registration services.

use http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tower::Service;

type CreateHook = Arc<dyn Fn(&mut Value) + Send + Sync>;

#[derive(Default)]
struct ApiState {
    /// Stored objects keyed by their item path
    objects: BTreeMap<String, Value>,
    /// Every request seen, as (method, path)
    requests: Vec<(String, String)>,
    /// Forced failures keyed by (method, path); a trailing `*` matches a prefix
    failures: HashMap<(String, String), (u16, String)>,
    /// Mutations applied to objects created in a collection, keyed by plural
    create_hooks: Vec<(String, CreateHook)>,
}

/// An in-memory API server answering GET, POST and DELETE for single objects.
///
/// Objects are stored as JSON under their item path, e.g.
/// `/api/v1/namespaces/foo/serviceaccounts/bar`. Unknown paths answer 404.
#[derive(Clone, Default)]
pub struct FakeApiServer {
    state: Arc<Mutex<ApiState>>,
}

impl FakeApiServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object at the path kube would use for it
    pub fn with_object<K>(self, object: &K) -> Self
    where
        K: Resource<DynamicType = ()> + Serialize,
    {
        let path = item_path(object);
        let value = serde_json::to_value(object).unwrap();
        self.state.lock().unwrap().objects.insert(path, value);
        self
    }

    /// Answer GET requests for `path` with an error status
    pub fn fail_get(self, path: &str, code: u16, message: &str) -> Self {
        self.fail("GET", path, code, message)
    }

    /// Answer POST requests to the collection `path` with an error status
    pub fn fail_create(self, path: &str, code: u16, message: &str) -> Self {
        self.fail("POST", path, code, message)
    }

    /// Answer DELETE requests for `path` with an error status
    pub fn fail_delete(self, path: &str, code: u16, message: &str) -> Self {
        self.fail("DELETE", path, code, message)
    }

    fn fail(self, method: &str, path: &str, code: u16, message: &str) -> Self {
        self.state.lock().unwrap().failures.insert(
            (method.to_string(), path.to_string()),
            (code, message.to_string()),
        );
        self
    }

    /// Mutate every object created in collections named `plural`, the way
    /// admission or a platform controller would
    pub fn on_create(self, plural: &str, hook: impl Fn(&mut Value) + Send + Sync + 'static) -> Self {
        self.state
            .lock()
            .unwrap()
            .create_hooks
            .push((plural.to_string(), Arc::new(hook)));
        self
    }

    /// Build a kube Client backed by this server
    pub fn client(&self) -> Client {
        Client::new(self.clone(), "default")
    }

    /// Decode the object stored at `path`
    pub fn object<K: DeserializeOwned>(&self, path: &str) -> Option<K> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(path)
            .map(|v| serde_json::from_value(v.clone()).unwrap())
    }

    /// Item paths of all stored objects starting with `prefix`
    pub fn paths(&self, prefix: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .objects
            .keys()
            .filter(|p| p.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// All requests seen so far, as (method, path)
    pub fn requests(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Number of POST requests made to the collection `path`
    pub fn creates(&self, path: &str) -> usize {
        self.count("POST", |p| p == path)
    }

    /// Number of POST requests made to any collection
    pub fn total_creates(&self) -> usize {
        self.count("POST", |_| true)
    }

    /// Number of DELETE requests for paths starting with `prefix`
    pub fn deletes(&self, prefix: &str) -> usize {
        self.count("DELETE", |p| p.starts_with(prefix))
    }

    fn count(&self, method: &str, matches: impl Fn(&str) -> bool) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|(m, p)| m == method && matches(p))
            .count()
    }

    fn handle(&self, method: &str, path: &str, body: &[u8]) -> (u16, String) {
        let mut state = self.state.lock().unwrap();
        state.requests.push((method.to_string(), path.to_string()));

        let failure = state.failures.iter().find_map(|((m, p), failure)| {
            let matched = match p.strip_suffix('*') {
                Some(prefix) => path.starts_with(prefix),
                None => p == path,
            };
            (m == method && matched).then(|| failure.clone())
        });
        if let Some((code, message)) = failure {
            return (code, status_json(code, &message));
        }

        match method {
            "GET" => match state.objects.get(path) {
                Some(object) => (200, object.to_string()),
                None => (404, not_found_json(plural_of(path), last_segment(path))),
            },
            "DELETE" => match state.objects.remove(path) {
                Some(object) => (200, object.to_string()),
                None => (404, not_found_json(plural_of(path), last_segment(path))),
            },
            "POST" => {
                let mut object: Value = match serde_json::from_slice(body) {
                    Ok(object) => object,
                    Err(e) => return (400, status_json(400, &e.to_string())),
                };
                let name = match object_name(&object) {
                    Some(name) => name,
                    None => return (422, status_json(422, "name or generateName is required")),
                };
                let key = format!("{}/{}", path, name);
                if state.objects.contains_key(&key) {
                    return (409, already_exists_json(last_segment(path), &name));
                }

                object["metadata"]["name"] = Value::String(name);
                object["metadata"]["uid"] = Value::String(uuid::Uuid::new_v4().to_string());
                object["metadata"]["resourceVersion"] = Value::String("1".to_string());
                let plural = last_segment(path);
                for (hook_plural, hook) in &state.create_hooks {
                    if hook_plural == plural {
                        hook(&mut object);
                    }
                }

                let response = object.to_string();
                state.objects.insert(key, object);
                (201, response)
            }
            _ => (405, status_json(405, "method not allowed")),
        }
    }
}

impl Service<Request<Body>> for FakeApiServer {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let server = self.clone();
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        Box::pin(async move {
            let body = req.into_body().collect().await?.to_bytes();
            let (status, response) = server.handle(&method, &path, &body);

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(response.into_bytes()))?)
        })
    }
}

fn item_path<K: Resource<DynamicType = ()>>(object: &K) -> String {
    format!(
        "{}/{}",
        K::url_path(&(), object.namespace().as_deref()),
        object.name_any()
    )
}

fn object_name(object: &Value) -> Option<String> {
    let metadata = object.get("metadata")?;
    if let Some(name) = metadata.get("name").and_then(Value::as_str) {
        return Some(name.to_string());
    }
    metadata
        .get("generateName")
        .and_then(Value::as_str)
        .map(|prefix| format!("{}{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..5]))
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

fn plural_of(item_path: &str) -> &str {
    item_path.rsplit('/').nth(1).unwrap_or_default()
}

fn status_json(code: u16, message: &str) -> String {
    let reason = match code {
        404 => "NotFound",
        409 => "AlreadyExists",
        403 => "Forbidden",
        _ => "InternalError",
    };
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, &format!("{} \"{}\" not found", resource, name))
}

/// Create a 409 already exists response
pub fn already_exists_json(resource: &str, name: &str) -> String {
    status_json(409, &format!("{} \"{}\" already exists", resource, name))
}

/// A request received by [`MockHttpServer`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// A minimal HTTP/1.1 server answering canned responses by method and path.
pub struct MockHttpServer {
    port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpServer {
    /// Start serving `(method, path, status, body)` routes on a random port
    pub async fn start(routes: Vec<(&'static str, &'static str, u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = routes.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    serve_connection(stream, &routes, &recorded).await;
                });
            }
        });

        Self { port, requests }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Recorded requests for the given method and path
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.recorded()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    routes: &[(&'static str, &'static str, u16, &'static str)],
    recorded: &Mutex<Vec<RecordedRequest>>,
) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };

    let (status, body) = routes
        .iter()
        .find(|(m, p, _, _)| *m == request.method && *p == request.path)
        .map(|(_, _, s, b)| (*s, *b))
        .unwrap_or((404, "not found"));
    recorded.lock().unwrap().push(request);

    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("");
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: BTreeMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}
