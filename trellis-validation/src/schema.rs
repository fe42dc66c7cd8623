//! Declarative object schemas for raw JSON input.
//!
//! A schema checks field presence, JSON types and a few refinements, and
//! reports every violation at once. Messages follow the wording of common
//! JavaScript schema libraries so clients see familiar errors.
//!
//! ```
//! use trellis_validation::{FieldSchema, ObjectSchema};
//! use serde_json::json;
//!
//! let schema = ObjectSchema::new()
//!     .field("name", FieldSchema::string().min_length(1))
//!     .field("email", FieldSchema::string().email())
//!     .field("age", FieldSchema::integer().min(0).optional());
//!
//! assert!(schema.validate(&json!({"name": "John", "email": "john@example.com"})).is_ok());
//!
//! let errors = schema.validate(&json!({"name": "", "age": 1.5})).unwrap_err();
//! assert_eq!(errors.len(), 3);
//! ```

use crate::{IsEmail, ValidationError, ValidationErrors};
use serde_json::Value;

/// JSON type expected for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }
}

/// Name of the JSON type of `value`, as reported in messages
fn received(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Rules for one field
#[derive(Debug, Clone)]
pub struct FieldSchema {
    kind: FieldType,
    optional: bool,
    nullable: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    email: bool,
    min: Option<f64>,
    max: Option<f64>,
    message: Option<String>,
}

impl FieldSchema {
    fn of(kind: FieldType) -> Self {
        Self {
            kind,
            optional: false,
            nullable: false,
            min_length: None,
            max_length: None,
            email: false,
            min: None,
            max: None,
            message: None,
        }
    }

    pub fn string() -> Self {
        Self::of(FieldType::String)
    }

    pub fn integer() -> Self {
        Self::of(FieldType::Integer)
    }

    pub fn number() -> Self {
        Self::of(FieldType::Number)
    }

    pub fn boolean() -> Self {
        Self::of(FieldType::Boolean)
    }

    pub fn array() -> Self {
        Self::of(FieldType::Array)
    }

    pub fn object() -> Self {
        Self::of(FieldType::Object)
    }

    /// Allow the field to be absent. `null` is still a type error.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Accept an explicit `null`
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn email(mut self) -> Self {
        self.email = true;
        self
    }

    pub fn min(mut self, min: impl Into<f64>) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn max(mut self, max: impl Into<f64>) -> Self {
        self.max = Some(max.into());
        self
    }

    pub fn positive(self) -> Self {
        self.min(1)
    }

    /// Replace the message of every refinement failure (length, email,
    /// bounds). Type and presence errors keep their wording.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn refinement(&self, default: impl Into<String>) -> String {
        self.message.clone().unwrap_or_else(|| default.into())
    }

    pub fn kind(&self) -> FieldType {
        self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    fn check(&self, field: &str, value: &Value, errors: &mut ValidationErrors) {
        if value.is_null() && self.nullable {
            return;
        }
        let type_ok = match (self.kind, value) {
            (FieldType::String, Value::String(_))
            | (FieldType::Number, Value::Number(_))
            | (FieldType::Boolean, Value::Bool(_))
            | (FieldType::Array, Value::Array(_))
            | (FieldType::Object, Value::Object(_)) => true,
            (FieldType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            _ => false,
        };

        if !type_ok {
            errors.add(
                ValidationError::new(
                    field,
                    format!("Expected {}, received {}", self.kind.as_str(), received(value)),
                )
                .with_constraint("invalid_type"),
            );
            return;
        }

        match value {
            Value::String(s) => self.check_string(field, s, errors),
            Value::Number(n) => {
                if let Some(n) = n.as_f64() {
                    self.check_number(field, n, errors);
                }
            }
            Value::Array(items) => self.check_length(field, items.len(), "element(s)", errors),
            _ => {}
        }
    }

    fn check_string(&self, field: &str, s: &str, errors: &mut ValidationErrors) {
        self.check_length(field, s.chars().count(), "character(s)", errors);

        if self.email && !IsEmail::is_valid(s) {
            errors.add(
                ValidationError::new(field, self.refinement("Invalid email"))
                    .with_constraint("invalid_string")
                    .with_value(s),
            );
        }
    }

    fn check_length(&self, field: &str, len: usize, unit: &str, errors: &mut ValidationErrors) {
        let noun = if self.kind == FieldType::Array { "Array" } else { "String" };
        if let Some(min) = self.min_length
            && len < min
        {
            errors.add(
                ValidationError::new(
                    field,
                    self.refinement(format!("{} must contain at least {} {}", noun, min, unit)),
                )
                .with_constraint("too_small"),
            );
        }
        if let Some(max) = self.max_length
            && len > max
        {
            errors.add(
                ValidationError::new(
                    field,
                    self.refinement(format!("{} must contain at most {} {}", noun, max, unit)),
                )
                .with_constraint("too_big"),
            );
        }
    }

    fn check_number(&self, field: &str, n: f64, errors: &mut ValidationErrors) {
        if let Some(min) = self.min
            && n < min
        {
            errors.add(
                ValidationError::new(
                    field,
                    self.refinement(format!("Number must be greater than or equal to {}", min)),
                )
                .with_constraint("too_small")
                .with_value(n.to_string()),
            );
        }
        if let Some(max) = self.max
            && n > max
        {
            errors.add(
                ValidationError::new(
                    field,
                    self.refinement(format!("Number must be less than or equal to {}", max)),
                )
                .with_constraint("too_big")
                .with_value(n.to_string()),
            );
        }
    }
}

/// Schema for a JSON object with named fields
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: Vec<(String, FieldSchema)>,
    strict: bool,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.fields.push((name.into(), schema));
        self
    }

    /// Reject keys that are not declared
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.fields.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    /// Check `value` against the schema, collecting every violation
    pub fn validate(&self, value: &Value) -> Result<(), ValidationErrors> {
        let Value::Object(map) = value else {
            return Err(ValidationError::new(
                "",
                format!("Expected object, received {}", received(value)),
            )
            .with_constraint("invalid_type")
            .into());
        };

        let mut errors = ValidationErrors::default();

        for (name, schema) in &self.fields {
            match map.get(name) {
                None if schema.optional => {}
                None => errors.add(
                    ValidationError::new(name, "Required").with_constraint("invalid_type"),
                ),
                Some(field_value) => schema.check(name, field_value, &mut errors),
            }
        }

        if self.strict {
            let unknown: Vec<&str> = map
                .keys()
                .filter(|key| !self.fields.iter().any(|(name, _)| name == *key))
                .map(String::as_str)
                .collect();
            if !unknown.is_empty() {
                errors.add(
                    ValidationError::new(
                        "",
                        format!("Unrecognized key(s) in object: '{}'", unknown.join("', '")),
                    )
                    .with_constraint("unrecognized_keys"),
                );
            }
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_schema() -> ObjectSchema {
        ObjectSchema::new()
            .field("name", FieldSchema::string().min_length(1))
            .field("email", FieldSchema::string().email())
            .field("age", FieldSchema::integer().positive().optional())
    }

    #[test]
    fn test_valid_object() {
        let value = json!({"name": "John", "email": "john@example.com", "age": 30});
        assert!(user_schema().validate(&value).is_ok());
    }

    #[test]
    fn test_reports_all_violations() {
        let value = json!({"name": 5, "age": 0});
        let errors = user_schema().validate(&value).unwrap_err();

        let messages: Vec<(&str, &str)> = errors
            .errors
            .iter()
            .map(|e| (e.field.as_str(), e.message.as_str()))
            .collect();
        assert_eq!(
            messages,
            vec![
                ("name", "Expected string, received number"),
                ("email", "Required"),
                ("age", "Number must be greater than or equal to 1"),
            ]
        );
    }

    #[test]
    fn test_string_refinements() {
        let value = json!({"name": "", "email": "nope"});
        let errors = user_schema().validate(&value).unwrap_err();
        assert_eq!(
            errors.get_field_errors("name")[0].message,
            "String must contain at least 1 character(s)"
        );
        assert_eq!(errors.get_field_errors("email")[0].message, "Invalid email");
    }

    #[test]
    fn test_integer_rejects_float_and_null() {
        let schema = ObjectSchema::new().field("age", FieldSchema::integer().optional());
        let errors = schema.validate(&json!({"age": 1.5})).unwrap_err();
        assert_eq!(errors.errors[0].message, "Expected integer, received float");

        let errors = schema.validate(&json!({"age": null})).unwrap_err();
        assert_eq!(errors.errors[0].message, "Expected integer, received null");

        assert!(schema.validate(&json!({})).is_ok());
    }

    #[test]
    fn test_nullable_and_custom_messages() {
        let schema = ObjectSchema::new()
            .field(
                "email",
                FieldSchema::string()
                    .email()
                    .with_message("email must be an email")
                    .optional()
                    .nullable(),
            )
            .field("name", FieldSchema::string().min_length(1));

        assert!(schema.validate(&json!({"email": null, "name": "a"})).is_ok());

        let errors = schema
            .validate(&json!({"email": "nope", "name": ""}))
            .unwrap_err();
        assert_eq!(errors.errors[0].message, "email must be an email");
        assert_eq!(
            errors.errors[1].message,
            "String must contain at least 1 character(s)"
        );

        let errors = schema.validate(&json!({"email": 3, "name": "a"})).unwrap_err();
        assert_eq!(errors.errors[0].message, "Expected string, received number");
    }

    #[test]
    fn test_non_object_input() {
        let errors = user_schema().validate(&json!(["a", "b"])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].message, "Expected object, received array");
    }

    #[test]
    fn test_strict_rejects_unknown_keys() {
        let schema = ObjectSchema::new()
            .field("name", FieldSchema::string())
            .strict();
        let errors = schema
            .validate(&json!({"name": "a", "admin": true}))
            .unwrap_err();
        assert_eq!(errors.errors[0].message, "Unrecognized key(s) in object: 'admin'");
    }

    #[test]
    fn test_array_length() {
        let schema = ObjectSchema::new().field("tags", FieldSchema::array().max_length(2));
        let errors = schema
            .validate(&json!({"tags": ["a", "b", "c"]}))
            .unwrap_err();
        assert_eq!(errors.errors[0].message, "Array must contain at most 2 element(s)");
    }
}
