// Routing system for HTTP requests

use crate::logging::{debug, trace};
use crate::{
    Container, Controller, Error, HttpMethod, HttpRequest, HttpResponse, HttpStatus, IntoResponse,
};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type BoxFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// A route handler function type.
///
/// The second argument is the status the route resolved for plain bodies.
pub type HandlerFn = Arc<dyn Fn(HttpRequest, HttpStatus) -> BoxFuture + Send + Sync>;

/// Redirect declared on a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub url: String,
    pub status: HttpStatus,
}

/// Route definition with handler and response metadata
#[derive(Clone)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    handler: HandlerFn,
    status: Option<HttpStatus>,
    redirect: Option<Redirect>,
    headers: Vec<(String, String)>,
}

impl Route {
    pub fn new<H, Fut, R>(method: HttpMethod, path: impl Into<String>, handler: H) -> Self
    where
        H: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Error>> + Send + 'static,
        R: IntoResponse,
    {
        let handler: HandlerFn = Arc::new(move |req, status| {
            let fut = handler(req);
            Box::pin(async move { fut.await?.into_response(status) })
        });

        Self {
            method,
            path: path.into(),
            handler,
            status: None,
            redirect: None,
            headers: Vec::new(),
        }
    }

    pub fn get<H, Fut, R>(path: impl Into<String>, handler: H) -> Self
    where
        H: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Error>> + Send + 'static,
        R: IntoResponse,
    {
        Self::new(HttpMethod::GET, path, handler)
    }

    pub fn post<H, Fut, R>(path: impl Into<String>, handler: H) -> Self
    where
        H: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Error>> + Send + 'static,
        R: IntoResponse,
    {
        Self::new(HttpMethod::POST, path, handler)
    }

    pub fn put<H, Fut, R>(path: impl Into<String>, handler: H) -> Self
    where
        H: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Error>> + Send + 'static,
        R: IntoResponse,
    {
        Self::new(HttpMethod::PUT, path, handler)
    }

    pub fn delete<H, Fut, R>(path: impl Into<String>, handler: H) -> Self
    where
        H: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Error>> + Send + 'static,
        R: IntoResponse,
    {
        Self::new(HttpMethod::DELETE, path, handler)
    }

    pub fn patch<H, Fut, R>(path: impl Into<String>, handler: H) -> Self
    where
        H: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Error>> + Send + 'static,
        R: IntoResponse,
    {
        Self::new(HttpMethod::PATCH, path, handler)
    }

    /// Override the status plain bodies are sent with
    pub fn http_code(mut self, status: HttpStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Add a static response header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Redirect to `url` after the handler succeeds
    pub fn redirect(mut self, url: impl Into<String>, status: HttpStatus) -> Self {
        self.redirect = Some(Redirect {
            url: url.into(),
            status,
        });
        self
    }

    /// Status for plain bodies: the override, else 201 for POST and 200 otherwise
    pub fn status(&self) -> HttpStatus {
        self.status.unwrap_or(match self.method {
            HttpMethod::POST => HttpStatus::Created,
            _ => HttpStatus::Ok,
        })
    }

    pub fn redirect_target(&self) -> Option<&Redirect> {
        self.redirect.as_ref()
    }

    /// Prefix this route's path with a controller base path
    pub fn nest(mut self, prefix: &str) -> Self {
        self.path = join_paths(prefix, &self.path);
        self
    }

    /// Run the handler and apply the route's response metadata
    pub async fn call(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let mut response = (self.handler)(request, self.status()).await?;

        for (key, value) in &self.headers {
            response.headers.insert(key.clone(), value.clone());
        }
        if let Some(redirect) = &self.redirect {
            response.status = redirect.status.code();
            response
                .headers
                .insert("Location".to_string(), redirect.url.clone());
        }

        Ok(response)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("status", &self.status())
            .field("redirect", &self.redirect)
            .finish()
    }
}

/// Adapt a controller method taking `Arc<Self>` into a route handler.
///
/// ```ignore
/// Route::get("/:id", bind(&self, Self::find_user))
/// ```
pub fn bind<C, F, Fut>(
    controller: &Arc<C>,
    method: F,
) -> impl Fn(HttpRequest) -> Fut + Send + Sync + 'static
where
    C: Send + Sync + 'static,
    F: Fn(Arc<C>, HttpRequest) -> Fut + Send + Sync + 'static,
{
    let controller = controller.clone();
    move |req| method(controller.clone(), req)
}

/// Router for managing routes and dispatching requests
pub struct Router {
    routes: Vec<Route>,
    container: Option<Container>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            container: None,
        }
    }

    /// Router that opens a request scope of `container` for every dispatch
    pub fn with_container(container: Container) -> Self {
        Self {
            routes: Vec::new(),
            container: Some(container),
        }
    }

    /// Add a route to the router
    pub fn add_route(&mut self, route: Route) {
        trace!(method = %route.method, path = %route.path, "Adding route");
        self.routes.push(route);
    }

    /// Add every route of a controller under its base path
    pub fn mount(&mut self, controller: Arc<dyn Controller>) {
        let base = controller.base_path();
        for route in controller.routes() {
            self.add_route(route.nest(base));
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find a route that matches the request and run it
    pub async fn route(&self, mut request: HttpRequest) -> Result<HttpResponse, Error> {
        let (path, query_string) = match request.path.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (request.path.clone(), None),
        };

        if let Some(query) = query_string {
            request.query_params = parse_query_string(&query);
        }

        let mut path_matched = false;
        for route in &self.routes {
            let Some(params) = match_path(&route.path, &path) else {
                continue;
            };
            if !route.method.as_str().eq_ignore_ascii_case(&request.method) {
                path_matched = true;
                continue;
            }

            debug!(
                method = %route.method,
                route = %route.path,
                path = %path,
                "Dispatching request"
            );
            request.path_params = params;
            request.path = path;
            if let Some(container) = &self.container {
                request.scope = Some(container.request_scope());
            }
            return route.call(request).await;
        }

        if path_matched {
            Err(Error::MethodNotAllowed(format!("{} {}", request.method, path)))
        } else {
            Err(Error::RouteNotFound(format!("{} {}", request.method, path)))
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Join a base path and a route path into one normalized path
fn join_paths(prefix: &str, path: &str) -> String {
    let joined: Vec<&str> = prefix
        .split('/')
        .chain(path.split('/'))
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", joined.join("/"))
}

fn decode(part: &str) -> String {
    let spaced = part.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// Match a route path pattern against a request path
/// Returns Some(params) if matched, None otherwise
fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(param_name) = pattern_part.strip_prefix(':') {
            params.insert(param_name.to_string(), decode(path_part));
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}

/// Parse a query string into a map of parameters
fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            (decode(key), decode(value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_route(method: HttpMethod, path: &str) -> Route {
        Route::new(method, path, |_req| async { Ok("ok") })
    }

    #[test]
    fn test_match_path_static() {
        let result = match_path("/users", "/users");
        assert_eq!(result.unwrap().len(), 0);
    }

    #[test]
    fn test_match_path_with_param() {
        let params = match_path("/users/:id", "/users/123").unwrap();
        assert_eq!(params.get("id"), Some(&"123".to_string()));
    }

    #[test]
    fn test_match_path_no_match() {
        assert!(match_path("/users/:id", "/posts/123").is_none());
        assert!(match_path("/users/:id", "/users").is_none());
    }

    #[test]
    fn test_match_path_multiple_params() {
        let params = match_path("/videos/first/:id/:name", "/videos/first/12/waseem").unwrap();
        assert_eq!(params.get("id"), Some(&"12".to_string()));
        assert_eq!(params.get("name"), Some(&"waseem".to_string()));
    }

    #[test]
    fn test_match_path_trailing_slash() {
        assert!(match_path("/users", "/users/").is_some());
    }

    #[test]
    fn test_match_path_decodes_params() {
        let params = match_path("/capitalize/:text", "/capitalize/hello%20world").unwrap();
        assert_eq!(params.get("text"), Some(&"hello world".to_string()));
    }

    #[test]
    fn test_match_path_root() {
        assert!(match_path("/", "/").is_some());
    }

    #[test]
    fn test_parse_query_string() {
        let params = parse_query_string("name=john&age=30");
        assert_eq!(params.get("name"), Some(&"john".to_string()));
        assert_eq!(params.get("age"), Some(&"30".to_string()));
    }

    #[test]
    fn test_parse_query_string_empty_and_flags() {
        assert!(parse_query_string("").is_empty());
        let params = parse_query_string("flag&debug=true");
        assert_eq!(params.get("flag"), Some(&String::new()));
        assert_eq!(params.get("debug"), Some(&"true".to_string()));
    }

    #[test]
    fn test_parse_query_string_decodes() {
        let params = parse_query_string("name=john%20doe&email=test%40example.com&q=a+b");
        assert_eq!(params.get("name"), Some(&"john doe".to_string()));
        assert_eq!(params.get("email"), Some(&"test@example.com".to_string()));
        assert_eq!(params.get("q"), Some(&"a b".to_string()));
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/users", ""), "/users");
        assert_eq!(join_paths("/users", "/:id"), "/users/:id");
        assert_eq!(join_paths("users", "profile"), "/users/profile");
        assert_eq!(join_paths("/", "/"), "/");
    }

    #[test]
    fn test_default_status_by_method() {
        assert_eq!(ok_route(HttpMethod::GET, "/").status(), HttpStatus::Ok);
        assert_eq!(ok_route(HttpMethod::POST, "/").status(), HttpStatus::Created);
        assert_eq!(
            ok_route(HttpMethod::POST, "/")
                .http_code(HttpStatus::Ok)
                .status(),
            HttpStatus::Ok
        );
    }

    #[tokio::test]
    async fn test_router_dispatches_with_params_and_query() {
        let mut router = Router::new();
        router.add_route(Route::get("/users/:id", |req: HttpRequest| async move {
            Ok(format!(
                "{}:{}",
                req.param("id").cloned().unwrap_or_default(),
                req.query("sort").cloned().unwrap_or_default()
            ))
        }));

        let response = router
            .route(HttpRequest::new("GET", "/users/7?sort=true"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body_string(), "7:true");
    }

    #[tokio::test]
    async fn test_router_not_found_and_method_not_allowed() {
        let mut router = Router::new();
        router.add_route(ok_route(HttpMethod::GET, "/users"));

        let missing = router.route(HttpRequest::new("GET", "/nope")).await;
        assert!(matches!(missing, Err(Error::RouteNotFound(_))));

        let wrong_method = router.route(HttpRequest::new("DELETE", "/users")).await;
        assert!(matches!(wrong_method, Err(Error::MethodNotAllowed(_))));
    }

    #[tokio::test]
    async fn test_route_redirect_and_headers() {
        let mut router = Router::new();
        router.add_route(
            ok_route(HttpMethod::POST, "/profile")
                .http_code(HttpStatus::Ok)
                .header("Cache-Control", "none")
                .redirect("/account", HttpStatus::Found),
        );

        let response = router
            .route(HttpRequest::new("POST", "/profile"))
            .await
            .unwrap();
        assert_eq!(response.status, 302);
        assert_eq!(response.header("location").unwrap(), "/account");
        assert_eq!(response.header("cache-control").unwrap(), "none");
    }

    #[tokio::test]
    async fn test_router_attaches_request_scope() {
        let container = Container::new();
        container.register(String::from("shared"));
        let mut router = Router::with_container(container);
        router.add_route(Route::get("/scope", |req: HttpRequest| async move {
            let value = req.resolve::<String>()?;
            Ok(value.as_str().to_string())
        }));

        let response = router.route(HttpRequest::new("GET", "/scope")).await.unwrap();
        assert_eq!(response.body_string(), "shared");
    }

    #[test]
    fn test_router_add_route() {
        let mut router = Router::new();
        for i in 0..5 {
            router.add_route(ok_route(HttpMethod::GET, &format!("/test{}", i)));
        }
        assert_eq!(router.routes().len(), 5);
    }
}
