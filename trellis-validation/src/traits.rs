// Validation traits

use crate::{ObjectSchema, ValidationError};

/// Trait for validatable types
pub trait Validate {
    /// Validate the value, reporting every violated rule
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Field presence and JSON types of the raw input.
    ///
    /// [`ValidationPipe`](crate::ValidationPipe) checks it when the input
    /// does not deserialize, so a missing or mistyped field is reported
    /// together with the other violations.
    fn shape() -> ObjectSchema
    where
        Self: Sized,
    {
        ObjectSchema::new()
    }
}

/// Collect the `Err` side of a list of validator results.
///
/// ```
/// use trellis_validation::{collect_errors, NotEmpty, IsEmail};
///
/// let result = collect_errors([
///     NotEmpty::validate("", "name"),
///     IsEmail::validate("john@example.com", "email"),
/// ]);
/// assert_eq!(result.unwrap_err().len(), 1);
/// ```
pub fn collect_errors(
    results: impl IntoIterator<Item = Result<(), ValidationError>>,
) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<ValidationError> = results.into_iter().filter_map(Result::err).collect();
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
