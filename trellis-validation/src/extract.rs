// Request argument extraction through pipes

use crate::{ArgumentMetadata, PipeTransform};
use serde_json::Value;
use trellis_core::{Error, HttpRequest};

/// Pull a handler argument out of a request and run it through a pipe.
///
/// ```
/// use trellis_core::HttpRequest;
/// use trellis_validation::{ParseIntPipe, PipedRequest};
///
/// let mut req = HttpRequest::new("GET", "/users/42");
/// req.path_params.insert("id".to_string(), "42".to_string());
/// assert_eq!(req.param_with("id", &ParseIntPipe).unwrap(), 42);
/// ```
pub trait PipedRequest {
    /// A path parameter, `null` when absent
    fn param_with<P: PipeTransform>(&self, name: &str, pipe: &P) -> Result<P::Output, Error>;

    /// A query parameter, `null` when absent
    fn query_with<P: PipeTransform>(&self, name: &str, pipe: &P) -> Result<P::Output, Error>;

    /// The JSON body, `null` when empty
    fn body_with<P: PipeTransform>(&self, pipe: &P) -> Result<P::Output, Error>;

    /// Raw JSON body, rejecting malformed input
    fn body_value(&self) -> Result<Value, Error>;
}

fn text_or_null(value: Option<&String>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.clone()))
}

impl PipedRequest for HttpRequest {
    fn param_with<P: PipeTransform>(&self, name: &str, pipe: &P) -> Result<P::Output, Error> {
        pipe.transform(text_or_null(self.param(name)), &ArgumentMetadata::param(name))
            .map_err(Error::from)
    }

    fn query_with<P: PipeTransform>(&self, name: &str, pipe: &P) -> Result<P::Output, Error> {
        pipe.transform(text_or_null(self.query(name)), &ArgumentMetadata::query(name))
            .map_err(Error::from)
    }

    fn body_with<P: PipeTransform>(&self, pipe: &P) -> Result<P::Output, Error> {
        let value = self.body_value()?;
        pipe.transform(value, &ArgumentMetadata::body())
            .map_err(Error::from)
    }

    fn body_value(&self) -> Result<Value, Error> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::BadRequest(format!("Invalid JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DefaultValuePipe, Identity, ParseBoolPipe, ParseIntPipe, PipeExt};

    #[test]
    fn test_missing_query_becomes_null() {
        let req = HttpRequest::new("GET", "/pipes/page");
        let page = req
            .query_with("page", &DefaultValuePipe::new(1).then(ParseIntPipe))
            .unwrap();
        assert_eq!(page, 1);
    }

    #[test]
    fn test_pipe_failure_is_bad_request() {
        let mut req = HttpRequest::new("GET", "/property/1");
        req.query_params.insert("sort".to_string(), "maybe".to_string());
        let err = req.query_with("sort", &ParseBoolPipe).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), ParseBoolPipe::MESSAGE);
    }

    #[test]
    fn test_body_handling() {
        let empty = HttpRequest::new("POST", "/body/one");
        assert_eq!(empty.body_with(&Identity).unwrap(), Value::Null);

        let malformed = HttpRequest::new("POST", "/body/one").with_body(b"{oops".to_vec());
        assert!(matches!(malformed.body_value(), Err(Error::BadRequest(_))));

        let json = HttpRequest::new("POST", "/body/one")
            .with_json(&serde_json::json!({"a": 1}))
            .unwrap();
        assert_eq!(json.body_with(&Identity).unwrap()["a"], 1);
    }
}
