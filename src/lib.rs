// Trellis - a NestJS-style HTTP framework for Rust
//
// Explicit route tables, transform pipes and a scoped dependency-injection
// container, wired together by modules.

// Re-export core functionality
pub use trellis_core::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use trellis_config;

#[cfg(feature = "testing")]
pub use trellis_testing;

#[cfg(feature = "validation")]
pub use trellis_validation;

// Re-export runtime crates so applications need only one dependency
pub use serde;
pub use serde_json;
pub use tokio;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Application, Container, Controller, ControllerRegistration, Error, HttpMethod,
        HttpRequest, HttpResponse, HttpStatus, IntoResponse, Json, Module, Provider,
        ProviderRegistration, Route, Router, Scope, Token, bind,
    };

    #[cfg(feature = "validation")]
    pub use trellis_validation::prelude::*;

    #[cfg(feature = "config")]
    pub use trellis_config::ConfigManager;
}
