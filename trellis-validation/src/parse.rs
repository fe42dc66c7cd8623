// Built-in parse pipes

use crate::{ArgumentMetadata, IsUuid, PipeError, PipeTransform};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use uuid::Uuid;

/// Text of a string argument, or of a JSON number passed directly
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses a whole-number string into `i64`
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseIntPipe;

impl ParseIntPipe {
    pub const MESSAGE: &'static str = "Validation failed (numeric string is expected)";

    fn parse(text: &str) -> Option<i64> {
        let digits = text.strip_prefix('-').unwrap_or(text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse().ok()
    }
}

impl PipeTransform for ParseIntPipe {
    type Output = i64;

    fn transform(&self, value: Value, _: &ArgumentMetadata) -> Result<i64, PipeError> {
        as_text(&value)
            .as_deref()
            .and_then(Self::parse)
            .ok_or_else(|| PipeError::bad_request(Self::MESSAGE))
    }
}

/// Parses a finite decimal number into `f64`
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseFloatPipe;

impl ParseFloatPipe {
    pub const MESSAGE: &'static str = "Validation failed (numeric string is expected)";
}

impl PipeTransform for ParseFloatPipe {
    type Output = f64;

    fn transform(&self, value: Value, _: &ArgumentMetadata) -> Result<f64, PipeError> {
        as_text(&value)
            .and_then(|text| text.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .ok_or_else(|| PipeError::bad_request(Self::MESSAGE))
    }
}

/// Parses `"true"` / `"false"` into `bool`
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseBoolPipe;

impl ParseBoolPipe {
    pub const MESSAGE: &'static str = "Validation failed (boolean string is expected)";
}

impl PipeTransform for ParseBoolPipe {
    type Output = bool;

    fn transform(&self, value: Value, _: &ArgumentMetadata) -> Result<bool, PipeError> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::String(s) if s == "true" => Ok(true),
            Value::String(s) if s == "false" => Ok(false),
            _ => Err(PipeError::bad_request(Self::MESSAGE)),
        }
    }
}

/// Splits a delimited string into a typed `Vec`.
///
/// Each item is first read as a JSON string, then as a JSON literal, so
/// `ParseArrayPipe::<i64>` accepts `"1,2,3"`.
pub struct ParseArrayPipe<T = String> {
    separator: String,
    optional: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ParseArrayPipe<T> {
    pub const MESSAGE: &'static str = "Validation failed (parsable array expected)";

    pub fn new() -> Self {
        Self {
            separator: ",".to_string(),
            optional: false,
            _marker: PhantomData,
        }
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Map a missing argument to an empty `Vec` instead of failing
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl<T> Default for ParseArrayPipe<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_item<T: DeserializeOwned>(item: Value) -> Option<T> {
    if let Ok(parsed) = serde_json::from_value::<T>(item.clone()) {
        return Some(parsed);
    }
    let Value::String(text) = item else {
        return None;
    };
    serde_json::from_str(text.trim()).ok()
}

impl<T: DeserializeOwned> PipeTransform for ParseArrayPipe<T> {
    type Output = Vec<T>;

    fn transform(&self, value: Value, _: &ArgumentMetadata) -> Result<Vec<T>, PipeError> {
        let items: Vec<Value> = match value {
            Value::Null if self.optional => return Ok(Vec::new()),
            Value::String(s) if s.is_empty() => Vec::new(),
            Value::String(s) => s
                .split(self.separator.as_str())
                .map(|item| Value::String(item.to_string()))
                .collect(),
            Value::Array(items) => items,
            _ => return Err(PipeError::bad_request(Self::MESSAGE)),
        };

        items
            .into_iter()
            .map(|item| parse_item(item).ok_or_else(|| PipeError::bad_request(Self::MESSAGE)))
            .collect()
    }
}

/// Parses a string into a member of a serde-deserializable enum
pub struct ParseEnumPipe<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E> ParseEnumPipe<E> {
    pub const MESSAGE: &'static str = "Validation failed (enum string is expected)";

    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Default for ParseEnumPipe<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DeserializeOwned> PipeTransform for ParseEnumPipe<E> {
    type Output = E;

    fn transform(&self, value: Value, _: &ArgumentMetadata) -> Result<E, PipeError> {
        if !value.is_string() {
            return Err(PipeError::bad_request(Self::MESSAGE));
        }
        serde_json::from_value(value).map_err(|_| PipeError::bad_request(Self::MESSAGE))
    }
}

/// Parses a hyphenated UUID, optionally of a required version
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseUuidPipe {
    check: IsUuid,
}

impl ParseUuidPipe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(version: u8) -> Self {
        Self {
            check: IsUuid::version(version),
        }
    }

    fn message(&self) -> String {
        match self.check.version {
            Some(v) => format!("Validation failed (uuid v{} is expected)", v),
            None => "Validation failed (uuid is expected)".to_string(),
        }
    }
}

impl PipeTransform for ParseUuidPipe {
    type Output = Uuid;

    fn transform(&self, value: Value, _: &ArgumentMetadata) -> Result<Uuid, PipeError> {
        match value.as_str() {
            Some(text) if self.check.is_valid(text) => {
                Uuid::parse_str(text).map_err(|_| PipeError::bad_request(self.message()))
            }
            _ => Err(PipeError::bad_request(self.message())),
        }
    }
}

/// Substitutes a default for a missing (`null`) argument
#[derive(Debug, Clone)]
pub struct DefaultValuePipe {
    default: Value,
}

impl DefaultValuePipe {
    pub fn new(default: impl Into<Value>) -> Self {
        Self {
            default: default.into(),
        }
    }
}

impl PipeTransform for DefaultValuePipe {
    type Output = Value;

    fn transform(&self, value: Value, _: &ArgumentMetadata) -> Result<Value, PipeError> {
        if value.is_null() {
            Ok(self.default.clone())
        } else {
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PipeExt;
    use serde::Deserialize;
    use serde_json::json;

    fn meta() -> ArgumentMetadata {
        ArgumentMetadata::param("value")
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Role {
        Admin,
        User,
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(ParseIntPipe.transform(json!("5"), &meta()).unwrap(), 5);
        assert_eq!(ParseIntPipe.transform(json!("-12"), &meta()).unwrap(), -12);
        assert_eq!(ParseIntPipe.transform(json!(7), &meta()).unwrap(), 7);

        for bad in [
            json!("5.5"),
            json!("abc"),
            json!("12abc"),
            json!(""),
            json!("-"),
            json!(null),
        ] {
            let err = ParseIntPipe.transform(bad, &meta()).unwrap_err();
            assert_eq!(err.to_string(), ParseIntPipe::MESSAGE);
        }
    }

    #[test]
    fn test_parse_int_overflow_is_rejected() {
        assert!(ParseIntPipe
            .transform(json!("99999999999999999999"), &meta())
            .is_err());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(ParseFloatPipe.transform(json!("2.5"), &meta()).unwrap(), 2.5);
        assert_eq!(ParseFloatPipe.transform(json!("2"), &meta()).unwrap(), 2.0);
        assert!(ParseFloatPipe.transform(json!("inf"), &meta()).is_err());
        assert!(ParseFloatPipe.transform(json!("NaN"), &meta()).is_err());
        assert!(ParseFloatPipe.transform(json!("pi"), &meta()).is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(ParseBoolPipe.transform(json!("true"), &meta()).unwrap());
        assert!(!ParseBoolPipe.transform(json!("false"), &meta()).unwrap());
        assert!(ParseBoolPipe.transform(json!(true), &meta()).unwrap());
        let err = ParseBoolPipe.transform(json!("yes"), &meta()).unwrap_err();
        assert_eq!(err.to_string(), "Validation failed (boolean string is expected)");
    }

    #[test]
    fn test_parse_array_of_strings() {
        let tags = ParseArrayPipe::<String>::new()
            .transform(json!("a,b,c"), &meta())
            .unwrap();
        assert_eq!(tags, vec!["a", "b", "c"]);

        let tags = ParseArrayPipe::<String>::new()
            .separator("|")
            .transform(json!("1|2"), &meta())
            .unwrap();
        assert_eq!(tags, vec!["1", "2"]);
    }

    #[test]
    fn test_parse_array_of_integers() {
        let ids = ParseArrayPipe::<i64>::new()
            .transform(json!("1,2,3"), &meta())
            .unwrap();
        assert_eq!(ids, vec![1, 2, 3]);

        let err = ParseArrayPipe::<i64>::new()
            .transform(json!("1,x"), &meta())
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation failed (parsable array expected)");
    }

    #[test]
    fn test_parse_array_missing() {
        assert!(ParseArrayPipe::<String>::new().transform(Value::Null, &meta()).is_err());
        assert!(ParseArrayPipe::<String>::new()
            .optional()
            .transform(Value::Null, &meta())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parse_enum() {
        let pipe = ParseEnumPipe::<Role>::new();
        assert_eq!(pipe.transform(json!("admin"), &meta()).unwrap(), Role::Admin);
        assert_eq!(pipe.transform(json!("user"), &meta()).unwrap(), Role::User);
        let err = pipe.transform(json!("root"), &meta()).unwrap_err();
        assert_eq!(err.to_string(), "Validation failed (enum string is expected)");
    }

    #[test]
    fn test_parse_uuid() {
        let id = "123e4567-e89b-12d3-a456-426614174000";
        let parsed = ParseUuidPipe::new().transform(json!(id), &meta()).unwrap();
        assert_eq!(parsed.to_string(), id);

        let err = ParseUuidPipe::version(4)
            .transform(json!(id), &meta())
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation failed (uuid v4 is expected)");

        let err = ParseUuidPipe::new()
            .transform(json!("123e4567e89b12d3a456426614174000"), &meta())
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation failed (uuid is expected)");
    }

    #[test]
    fn test_default_value_then_parse_int() {
        let pipe = DefaultValuePipe::new(1).then(ParseIntPipe);
        assert_eq!(pipe.transform(Value::Null, &meta()).unwrap(), 1);
        assert_eq!(pipe.transform(json!("3"), &meta()).unwrap(), 3);
        assert!(pipe.transform(json!("three"), &meta()).is_err());
    }
}
