// Test HTTP Client

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use trellis_core::{HttpMethod, HttpRequest, HttpResponse, Router};

/// Test HTTP client that dispatches straight into a router.
///
/// Routing and handler errors are rendered exactly as the server renders
/// them, so tests see the same status codes and JSON bodies a real client
/// would.
#[derive(Clone)]
pub struct TestClient {
    router: Arc<Router>,
}

impl TestClient {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::GET, path)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::DELETE, path))
            .await
    }

    /// POST a JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::POST, path).json(body))
            .await
    }

    /// PUT a JSON body
    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::PUT, path).json(body))
            .await
    }

    /// Send a request assembled with [`TestRequestBuilder`]
    pub async fn send(&self, request: TestRequestBuilder) -> TestResponse {
        self.dispatch(request.build()).await
    }

    /// Dispatch a raw request
    pub async fn dispatch(&self, request: HttpRequest) -> TestResponse {
        let response = match self.router.route(request).await {
            Ok(response) => response,
            Err(error) => error.to_response(),
        };
        TestResponse::new(response)
    }
}

/// Builder for test requests
pub struct TestRequestBuilder {
    method: HttpMethod,
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    query_params: Vec<(String, String)>,
}

impl TestRequestBuilder {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
            query_params: Vec::new(),
        }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Set a raw body
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body.
    ///
    /// Panics if `data` cannot be serialized, which is a bug in the test.
    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        self.body = serde_json::to_vec(data).expect("test request body must serialize");
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self
    }

    /// Add a query parameter, percent-encoded
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> HttpRequest {
        let mut path = self.path;
        if !self.query_params.is_empty() {
            let params: Vec<String> = self
                .query_params
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            path.push(if path.contains('?') { '&' } else { '?' });
            path.push_str(&params.join("&"));
        }

        let mut request = HttpRequest::new(self.method.as_str(), path);
        request.headers = self.headers;
        request.body = self.body;
        request
    }
}

/// Response from a test request
#[derive(Debug, Clone)]
pub struct TestResponse {
    response: HttpResponse,
}

impl TestResponse {
    pub fn new(response: HttpResponse) -> Self {
        Self { response }
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn body_string(&self) -> String {
        self.response.body_string()
    }

    /// Parse the body as JSON.
    ///
    /// Panics with the raw body when it is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.response.body).unwrap_or_else(|e| {
            panic!(
                "response body is not the expected JSON ({}): {}",
                e,
                self.body_string()
            )
        })
    }

    /// Get a header value, ignoring case
    pub fn header(&self, key: &str) -> Option<&String> {
        self.response.header(key)
    }

    pub fn into_inner(self) -> HttpResponse {
        self.response
    }
}

impl AsRef<HttpResponse> for TestResponse {
    fn as_ref(&self) -> &HttpResponse {
        &self.response
    }
}
