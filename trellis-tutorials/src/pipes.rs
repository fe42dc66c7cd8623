//! Custom pipes used by the pipes tutorial

use serde_json::Value;
use trellis_validation::{ArgumentMetadata, PipeError, PipeTransform};

/// Uppercases the first character and lowercases the rest
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalizePipe;

impl CapitalizePipe {
    pub const MESSAGE: &'static str = "Value must be a string";

    pub fn capitalize(text: &str) -> String {
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.as_str().to_lowercase().chars())
                .collect(),
            None => String::new(),
        }
    }
}

impl PipeTransform for CapitalizePipe {
    type Output = String;

    fn transform(&self, value: Value, _: &ArgumentMetadata) -> Result<String, PipeError> {
        match value {
            Value::String(text) => Ok(Self::capitalize(&text)),
            _ => Err(PipeError::bad_request(Self::MESSAGE)),
        }
    }
}

/// Parses an integer and checks it lies in `min..=max`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangePipe {
    min: i64,
    max: i64,
}

/// Why a leading integer could not be produced
enum Leading {
    Missing,
    Overflow,
}

impl RangePipe {
    pub const NOT_A_NUMBER: &'static str = "Value must be a number";

    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    fn out_of_range(&self) -> PipeError {
        PipeError::bad_request(format!(
            "Number must be between {} and {}",
            self.min, self.max
        ))
    }

    /// The integer at the start of `text`, after optional whitespace and sign.
    /// Anything after the digits is ignored, so `"42px"` reads as 42.
    fn leading_integer(text: &str) -> Result<i64, Leading> {
        let text = text.trim_start();
        let sign = usize::from(matches!(text.as_bytes().first(), Some(b'-' | b'+')));
        let digits = text[sign..].bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err(Leading::Missing);
        }

        // Parsed with its sign so i64::MIN is representable.
        text[..sign + digits].parse().map_err(|_| Leading::Overflow)
    }
}

impl PipeTransform for RangePipe {
    type Output = i64;

    fn transform(&self, value: Value, _: &ArgumentMetadata) -> Result<i64, PipeError> {
        let text = match value {
            Value::String(text) => text,
            Value::Number(n) => n.to_string(),
            _ => return Err(PipeError::bad_request(Self::NOT_A_NUMBER)),
        };

        let number = match Self::leading_integer(&text) {
            Ok(number) => number,
            Err(Leading::Missing) => return Err(PipeError::bad_request(Self::NOT_A_NUMBER)),
            Err(Leading::Overflow) => return Err(self.out_of_range()),
        };

        if (self.min..=self.max).contains(&number) {
            Ok(number)
        } else {
            Err(self.out_of_range())
        }
    }
}
