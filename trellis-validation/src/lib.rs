//! Validation and transform pipes for Trellis
//!
//! Provides field validators, declarative object schemas and the pipe
//! abstraction used to turn raw request arguments into typed values.
//!
//! # Examples
//!
//! ## DTO validation
//!
//! ```
//! use trellis_validation::{collect_errors, IsEmail, NotEmpty, Validate, ValidationError};
//!
//! struct UserInput {
//!     name: String,
//!     email: String,
//! }
//!
//! impl Validate for UserInput {
//!     fn validate(&self) -> Result<(), Vec<ValidationError>> {
//!         collect_errors([
//!             NotEmpty::validate(&self.name, "name"),
//!             IsEmail::validate(&self.email, "email"),
//!         ])
//!     }
//! }
//!
//! let input = UserInput {
//!     name: "John".to_string(),
//!     email: "john@example.com".to_string(),
//! };
//! assert!(input.validate().is_ok());
//! ```
//!
//! ## Pipes
//!
//! ```
//! use serde_json::json;
//! use trellis_validation::{
//!     ArgumentMetadata, DefaultValuePipe, ParseIntPipe, PipeExt, PipeTransform,
//! };
//!
//! let page = DefaultValuePipe::new(1).then(ParseIntPipe);
//! let meta = ArgumentMetadata::query("page");
//!
//! assert_eq!(page.transform(json!(null), &meta).unwrap(), 1);
//! assert_eq!(page.transform(json!("4"), &meta).unwrap(), 4);
//! assert!(page.transform(json!("four"), &meta).is_err());
//! ```

mod errors;
mod extract;
mod parse;
mod pipe;
mod schema;
mod traits;
mod validators;

pub use errors::*;
pub use extract::*;
pub use parse::*;
pub use pipe::*;
pub use schema::*;
pub use traits::*;
pub use validators::*;

pub mod prelude {
    pub use crate::{
        ArgumentMetadata, DefaultValuePipe, FieldSchema, IsEmail, NotEmpty, ObjectSchema,
        ParseArrayPipe, ParseBoolPipe, ParseEnumPipe, ParseFloatPipe, ParseIntPipe, ParseUuidPipe,
        PipeError, PipeExt, PipeTransform, PipedRequest, SchemaPipe, Validate, ValidationError,
        ValidationPipe, collect_errors,
    };
}
