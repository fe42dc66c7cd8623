// Core traits for the Trellis framework

use crate::{Container, Error, Route, Scope};
use std::sync::Arc;

/// Trait for types the DI container can construct.
///
/// `construct` is the constructor injection point: resolve dependencies from
/// the container and build the instance. `scope` picks the instance lifetime.
pub trait Provider: Send + Sync + Sized + 'static {
    /// Lifetime of instances built by the container
    fn scope() -> Scope {
        Scope::Singleton
    }

    /// Build an instance, resolving dependencies from `container`
    fn construct(container: &Container) -> Result<Self, Error>;
}

/// Trait for HTTP controllers
///
/// A controller owns a base path and an explicit route table. Each route maps
/// one verb and path to exactly one controller method.
pub trait Controller: Send + Sync + 'static {
    /// Returns the base path for this controller
    fn base_path(&self) -> &'static str;

    /// Returns the routes of this controller, relative to `base_path`
    fn routes(self: Arc<Self>) -> Vec<Route>;
}

/// HTTP methods
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "HEAD" => Some(HttpMethod::HEAD),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
