// Validation errors

use serde::Serialize;
use std::fmt;
use trellis_core::Error;

/// Validation error for a single field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Field name that failed validation
    pub field: String,

    /// Error message
    pub message: String,

    /// Validation constraint that failed
    pub constraint: String,

    /// Value that failed validation (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            constraint: "custom".to_string(),
            value: None,
        }
    }

    /// Set the constraint name
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = constraint.into();
        self
    }

    /// Set the invalid value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Get errors for a specific field
    pub fn get_field_errors(&self, field: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.errors).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::new(errors)
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::new(vec![error])
    }
}

/// Failure raised by a pipe. Always a client error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipeError {
    /// Input that cannot be turned into the expected value
    #[error("{0}")]
    BadRequest(String),

    /// Structured input that violates one or more field rules
    #[error("{message}: {errors}")]
    Validation {
        message: String,
        errors: ValidationErrors,
    },
}

impl PipeError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        PipeError::BadRequest(message.into())
    }

    /// Field errors, empty for a plain bad request
    pub fn field_errors(&self) -> &[ValidationError] {
        match self {
            PipeError::BadRequest(_) => &[],
            PipeError::Validation { errors, .. } => &errors.errors,
        }
    }
}

impl From<ValidationErrors> for PipeError {
    fn from(errors: ValidationErrors) -> Self {
        PipeError::Validation {
            message: "Validation failed".to_string(),
            errors,
        }
    }
}

impl From<PipeError> for Error {
    fn from(err: PipeError) -> Self {
        match err {
            PipeError::BadRequest(message) => Error::BadRequest(message),
            PipeError::Validation { message, errors } => Error::ValidationFailed {
                message,
                details: errors.to_json(),
            },
        }
    }
}
