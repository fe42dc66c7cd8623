// HTTP request and response types

use crate::{Container, Error, HttpStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// HTTP request wrapper
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub path_params: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    /// Request-scoped container, attached by the router on dispatch.
    pub scope: Option<Container>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            body: Vec::new(),
            path_params: HashMap::new(),
            query_params: HashMap::new(),
            scope: None,
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Serialize `value` as the JSON body
    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, Error> {
        self.body = serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    /// Parse the request body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Get a path parameter by name
    pub fn param(&self, name: &str) -> Option<&String> {
        self.path_params.get(name)
    }

    /// Get a query parameter by name
    pub fn query(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Get a header by name, ignoring case
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Resolve a provider through this request's scope.
    ///
    /// Request-scoped providers are only resolvable after the router has
    /// attached a scope to the request.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.container()?.resolve::<T>()
    }

    /// Resolve a provider registered under a string token
    pub fn resolve_named<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<T>, Error> {
        self.container()?.resolve_named::<T>(name)
    }

    fn container(&self) -> Result<&Container, Error> {
        self.scope.as_ref().ok_or_else(|| {
            Error::DependencyInjection("request has no container scope attached".to_string())
        })
    }
}

/// HTTP response wrapper
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_status(status: HttpStatus) -> Self {
        Self::new(status.code())
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn created() -> Self {
        Self::new(201)
    }

    pub fn no_content() -> Self {
        Self::new(204)
    }

    pub fn bad_request() -> Self {
        Self::new(400)
    }

    pub fn not_found() -> Self {
        Self::new(404)
    }

    pub fn internal_server_error() -> Self {
        Self::new(500)
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.body = text.into().into_bytes();
        self.headers.insert(
            "Content-Type".to_string(),
            "text/plain; charset=utf-8".to_string(),
        );
        self
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, Error> {
        self.body =
            serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Get a header by name, ignoring case
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Body decoded as UTF-8, lossy
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// JSON response helper
#[derive(Debug, Clone)]
pub struct Json<T: Serialize>(pub T);

/// Conversion from a handler's return value into a response.
///
/// `status` is the route's resolved status (its `http_code` override, or the
/// method default). Plain bodies adopt it; a full `HttpResponse` keeps its own.
pub trait IntoResponse {
    fn into_response(self, status: HttpStatus) -> Result<HttpResponse, Error>;
}

impl IntoResponse for HttpResponse {
    fn into_response(self, _status: HttpStatus) -> Result<HttpResponse, Error> {
        Ok(self)
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self, status: HttpStatus) -> Result<HttpResponse, Error> {
        HttpResponse::with_status(status).with_json(&self.0)
    }
}

impl IntoResponse for serde_json::Value {
    fn into_response(self, status: HttpStatus) -> Result<HttpResponse, Error> {
        HttpResponse::with_status(status).with_json(&self)
    }
}

impl IntoResponse for String {
    fn into_response(self, status: HttpStatus) -> Result<HttpResponse, Error> {
        Ok(HttpResponse::with_status(status).with_text(self))
    }
}

impl IntoResponse for &'static str {
    fn into_response(self, status: HttpStatus) -> Result<HttpResponse, Error> {
        Ok(HttpResponse::with_status(status).with_text(self))
    }
}

impl IntoResponse for () {
    fn into_response(self, status: HttpStatus) -> Result<HttpResponse, Error> {
        Ok(HttpResponse::with_status(status))
    }
}
