//! Testing utilities for Trellis applications
//!
//! Bootstrap a module with [`TestApp`], then drive it in-process with a
//! [`TestClient`]. No socket is opened.
//!
//! ```
//! use std::sync::Arc;
//! use trellis_core::{Controller, ControllerRegistration, Module, Route};
//! use trellis_testing::{TestApp, assert_status};
//!
//! struct Hello;
//!
//! impl Controller for Hello {
//!     fn base_path(&self) -> &'static str {
//!         "/hello"
//!     }
//!
//!     fn routes(self: Arc<Self>) -> Vec<Route> {
//!         vec![Route::get("", |_req| async { Ok("hi") })]
//!     }
//! }
//!
//! struct AppModule;
//!
//! impl Module for AppModule {
//!     fn controllers(&self) -> Vec<ControllerRegistration> {
//!         vec![ControllerRegistration::new("Hello", |_| Ok(Arc::new(Hello)))]
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let client = TestApp::from_module(AppModule).unwrap().client();
//! let response = client.get("/hello").await;
//! assert_status(&response, 200);
//! assert_eq!(response.body_string(), "hi");
//! # });
//! ```

pub mod assertions;
pub mod test_app;
pub mod test_client;

pub use assertions::*;
pub use test_app::*;
pub use test_client::*;
