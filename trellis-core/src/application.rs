// Application bootstrapper and HTTP server

use crate::logging::{debug, error, info, warn};
use crate::{Container, Error, HttpRequest, HttpResponse, Module, Router};
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode, body::Incoming as IncomingBody};
use hyper_util::rt::TokioIo;
use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// The main application struct
pub struct Application {
    container: Container,
    router: Arc<Router>,
}

impl Application {
    /// Create an application with a container and router
    pub fn new(container: Container, router: Router) -> Self {
        Self {
            container,
            router: Arc::new(router),
        }
    }

    /// Bootstrap an application from a root module
    pub fn create(root: impl Module) -> Result<Self, Error> {
        Self::create_with(Container::new(), root)
    }

    /// Bootstrap into a container that already holds providers,
    /// e.g. the results of async factories
    pub fn create_with(container: Container, root: impl Module) -> Result<Self, Error> {
        info!(module = root.name(), "Bootstrapping application");

        let mut router = Router::with_container(container.clone());
        let mut seen = HashSet::new();
        Self::register_module(&container, &mut router, &root, &mut seen)?;

        info!(
            modules = seen.len(),
            providers = container.len(),
            routes = router.routes().len(),
            "Application bootstrap complete"
        );

        Ok(Self {
            container,
            router: Arc::new(router),
        })
    }

    /// Register a module and its imports recursively
    fn register_module(
        container: &Container,
        router: &mut Router,
        module: &dyn Module,
        seen: &mut HashSet<&'static str>,
    ) -> Result<(), Error> {
        if !seen.insert(module.name()) {
            debug!(module = module.name(), "Module already registered, skipping");
            return Ok(());
        }

        for imported in module.imports() {
            Self::register_module(container, router, imported.as_ref(), seen)?;
        }

        for provider in module.providers() {
            provider.register(container)?;
            debug!(module = module.name(), token = provider.token.name(), "Registered provider");
        }

        for token in module.exports() {
            if !container.has_token(&token) {
                return Err(Error::DependencyInjection(format!(
                    "module {} exports {} but no provider is registered for it",
                    module.name(),
                    token
                )));
            }
        }

        for registration in module.controllers() {
            let controller = registration.instantiate(container).inspect_err(|e| {
                error!(
                    controller = registration.type_name,
                    error = %e,
                    "Failed to instantiate controller"
                );
            })?;
            let base_path = controller.base_path();
            router.mount(controller);
            info!(controller = registration.type_name, base_path, "Registered controller");
        }

        Ok(())
    }

    /// Start the HTTP server on the specified port
    pub async fn listen(self, port: u16) -> Result<(), Error> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, std::future::pending()).await
    }

    /// Serve connections from `listener` until `shutdown` completes
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        info!(addr = ?listener.local_addr().ok(), "Server listening");
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = &mut shutdown => {
                    info!("Shutting down server");
                    return Ok(());
                }
            };
            let io = TokioIo::new(stream);
            let router = self.router.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<IncomingBody>| {
                    let router = router.clone();
                    async move { handle_request(req, router).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(%peer, error = %err, "Error serving connection");
                }
            });
        }
    }

    /// Get a reference to the DI container
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Shared handle to the router, for in-process dispatch
    pub fn router(&self) -> Arc<Router> {
        self.router.clone()
    }
}

/// Handle an incoming HTTP request
async fn handle_request(
    req: Request<IncomingBody>,
    router: Arc<Router>,
) -> Result<Response<Full<bytes::Bytes>>, hyper::Error> {
    let method = req.method().to_string();
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let mut request = HttpRequest::new(method, path);

    for (name, value) in req.headers() {
        if let Ok(value_str) = value.to_str() {
            request
                .headers
                .insert(name.to_string(), value_str.to_string());
        }
    }

    request.body = req.collect().await?.to_bytes().to_vec();

    let response = match router.route(request).await {
        Ok(resp) => resp,
        Err(err) => {
            if err.is_server_error() {
                error!(error = %err, "Request failed");
            } else {
                debug!(error = %err, "Request rejected");
            }
            err.to_response()
        }
    };

    Ok(to_hyper_response(response))
}

fn to_hyper_response(response: HttpResponse) -> Response<Full<bytes::Bytes>> {
    let mut builder = Response::builder().status(response.status);

    for (key, value) in response.headers {
        builder = builder.header(key, value);
    }

    builder
        .body(Full::new(bytes::Bytes::from(response.body)))
        .unwrap_or_else(|e| {
            error!(error = %e, "Failed to build response");
            let mut fallback = Response::new(Full::new(bytes::Bytes::new()));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}
