// Built-in validators

use crate::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$").unwrap()
});

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-([0-9a-f])[0-9a-f]{3}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .unwrap()
});

// String validators

/// Validates that a string is not empty
pub struct NotEmpty;

impl NotEmpty {
    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(
                ValidationError::new(field, format!("{} should not be empty", field))
                    .with_constraint("isNotEmpty"),
            )
        } else {
            Ok(())
        }
    }
}

/// Validates minimum string length, in characters
pub struct MinLength(pub usize);

impl MinLength {
    pub fn validate(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        if value.chars().count() < self.0 {
            Err(ValidationError::new(
                field,
                format!(
                    "{} must be longer than or equal to {} characters",
                    field, self.0
                ),
            )
            .with_constraint("minLength")
            .with_value(value))
        } else {
            Ok(())
        }
    }
}

/// Validates maximum string length, in characters
pub struct MaxLength(pub usize);

impl MaxLength {
    pub fn validate(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        if value.chars().count() > self.0 {
            Err(ValidationError::new(
                field,
                format!(
                    "{} must be shorter than or equal to {} characters",
                    field, self.0
                ),
            )
            .with_constraint("maxLength")
            .with_value(value))
        } else {
            Ok(())
        }
    }
}

/// Validates email format
pub struct IsEmail;

impl IsEmail {
    pub fn is_valid(value: &str) -> bool {
        EMAIL_REGEX.is_match(value)
    }

    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        if Self::is_valid(value) {
            Ok(())
        } else {
            Err(
                ValidationError::new(field, format!("{} must be an email", field))
                    .with_constraint("isEmail")
                    .with_value(value),
            )
        }
    }
}

/// Validates UUID format (hyphenated, any case), optionally of one version
#[derive(Debug, Clone, Copy, Default)]
pub struct IsUuid {
    pub version: Option<u8>,
}

impl IsUuid {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn version(version: u8) -> Self {
        Self {
            version: Some(version),
        }
    }

    pub fn is_valid(&self, value: &str) -> bool {
        let Some(caps) = UUID_REGEX.captures(value) else {
            return false;
        };
        match self.version {
            None => true,
            Some(expected) => caps
                .get(1)
                .and_then(|m| u8::from_str_radix(m.as_str(), 16).ok())
                .is_some_and(|v| v == expected),
        }
    }

    pub fn validate(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        if self.is_valid(value) {
            Ok(())
        } else {
            Err(
                ValidationError::new(field, format!("{} must be a UUID", field))
                    .with_constraint("isUuid")
                    .with_value(value),
            )
        }
    }
}

// Number validators

/// Validates an integer lies within inclusive bounds
#[derive(Debug, Clone, Copy)]
pub struct InRange {
    pub min: i64,
    pub max: i64,
}

impl InRange {
    pub fn validate(&self, value: i64, field: &str) -> Result<(), ValidationError> {
        if value < self.min {
            Err(ValidationError::new(
                field,
                format!("{} must not be less than {}", field, self.min),
            )
            .with_constraint("min")
            .with_value(value.to_string()))
        } else if value > self.max {
            Err(ValidationError::new(
                field,
                format!("{} must not be greater than {}", field, self.max),
            )
            .with_constraint("max")
            .with_value(value.to_string()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty() {
        assert!(NotEmpty::validate("John", "name").is_ok());
        let err = NotEmpty::validate("   ", "name").unwrap_err();
        assert_eq!(err.message, "name should not be empty");
        assert_eq!(err.constraint, "isNotEmpty");
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(MinLength(3).validate("héé", "name").is_ok());
        assert!(MinLength(3).validate("hé", "name").is_err());
        assert!(MaxLength(2).validate("hé", "name").is_ok());
        let err = MaxLength(2).validate("abc", "name").unwrap_err();
        assert_eq!(err.message, "name must be shorter than or equal to 2 characters");
    }

    #[test]
    fn test_is_email() {
        assert!(IsEmail::validate("john@example.com", "email").is_ok());
        assert!(IsEmail::validate("first.last+tag@sub.example.org", "email").is_ok());
        assert!(IsEmail::validate("john@localhost", "email").is_err());
        assert!(IsEmail::validate("not-an-email", "email").is_err());
        assert_eq!(
            IsEmail::validate("x", "email").unwrap_err().message,
            "email must be an email"
        );
    }

    #[test]
    fn test_is_uuid() {
        let v4 = "123e4567-e89b-42d3-a456-426614174000";
        assert!(IsUuid::any().is_valid(v4));
        assert!(IsUuid::any().is_valid(&v4.to_uppercase()));
        assert!(IsUuid::version(4).is_valid(v4));
        assert!(!IsUuid::version(1).is_valid(v4));
        assert!(!IsUuid::any().is_valid("123e4567e89b42d3a456426614174000"));
        assert!(IsUuid::any().validate("nope", "id").is_err());
    }

    #[test]
    fn test_in_range() {
        let range = InRange { min: 0, max: 150 };
        assert!(range.validate(0, "age").is_ok());
        assert!(range.validate(150, "age").is_ok());
        assert_eq!(
            range.validate(-1, "age").unwrap_err().message,
            "age must not be less than 0"
        );
        assert_eq!(
            range.validate(151, "age").unwrap_err().message,
            "age must not be greater than 150"
        );
    }
}
