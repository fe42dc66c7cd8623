// Core library for the Trellis HTTP framework
// This module contains the foundational types, traits, and runtime components

pub mod application;
pub mod container;
pub mod error;
pub mod http;
pub mod logging;
pub mod module;
pub mod routing;
pub mod status;
pub mod traits;

// Re-export commonly used types
pub use application::*;
pub use container::*;
pub use error::*;
pub use http::*;
pub use module::*;
pub use routing::{HandlerFn, Redirect, Route, Router, bind};
pub use status::*;
pub use traits::*;
