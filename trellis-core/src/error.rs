// Error types for the Trellis framework

use crate::{HttpResponse, HttpStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Dependency injection error: {0}")]
    DependencyInjection(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A validation failure that carries per-field details for the client.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        message: String,
        details: serde_json::Value,
    },

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.http_status().code()
    }

    /// Get the HttpStatus enum for this error
    pub fn http_status(&self) -> HttpStatus {
        match self {
            Error::RouteNotFound(_) | Error::NotFound(_) => HttpStatus::NotFound,
            Error::MethodNotAllowed(_) => HttpStatus::MethodNotAllowed,

            Error::Validation(_)
            | Error::ValidationFailed { .. }
            | Error::Deserialization(_)
            | Error::BadRequest(_) => HttpStatus::BadRequest,

            Error::DependencyInjection(_)
            | Error::ProviderNotFound(_)
            | Error::Serialization(_)
            | Error::Internal(_)
            | Error::Io(_) => HttpStatus::InternalServerError,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.http_status().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.http_status().is_server_error()
    }

    /// The message without the variant prefix.
    ///
    /// Server errors are masked so internal details never reach the client.
    pub fn message(&self) -> String {
        match self {
            Error::RouteNotFound(m)
            | Error::MethodNotAllowed(m)
            | Error::Validation(m)
            | Error::Deserialization(m)
            | Error::BadRequest(m)
            | Error::NotFound(m) => m.clone(),
            Error::ValidationFailed { message, .. } => message.clone(),
            _ => HttpStatus::InternalServerError.reason().to_string(),
        }
    }

    /// Render the error as the JSON response the client sees.
    pub fn to_response(&self) -> HttpResponse {
        let status = self.http_status();
        let mut body = serde_json::json!({
            "status": status.code(),
            "error": status.reason(),
            "message": self.message(),
        });
        if let Error::ValidationFailed { details, .. } = self {
            body["details"] = details.clone();
        }

        HttpResponse::new(status.code())
            .with_json(&body)
            .unwrap_or_else(|_| HttpResponse::internal_server_error())
    }
}
