// Test Application Builder

use crate::TestClient;
use std::sync::Arc;
use trellis_core::{Application, Container, Error, Module};

/// A bootstrapped application for integration tests
pub struct TestApp {
    app: Application,
}

impl TestApp {
    /// Bootstrap `root` exactly as the server would
    pub fn from_module(root: impl Module) -> Result<Self, Error> {
        Ok(Self {
            app: Application::create(root)?,
        })
    }

    /// Bootstrap into a pre-populated container
    pub fn with_container(container: Container, root: impl Module) -> Result<Self, Error> {
        Ok(Self {
            app: Application::create_with(container, root)?,
        })
    }

    pub fn from_application(app: Application) -> Self {
        Self { app }
    }

    /// Create a test client for making requests
    pub fn client(&self) -> TestClient {
        TestClient::new(self.app.router())
    }

    pub fn container(&self) -> &Container {
        self.app.container()
    }

    /// Resolve a provider from the application's container
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.app.container().resolve::<T>()
    }
}
