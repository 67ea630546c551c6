//! Range checks for configuration values.
//!
//! Checks accumulate into a [`Validator`] so one pass reports every bad value
//! instead of stopping at the first.

use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Numeric value outside its allowed range.
    #[error("'{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted parameter name, e.g. `capture.sample_rate_hz`.
        param: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Converter channel outside 0..=7.
    #[error("capture.channel {0} is not in 0..=7")]
    InvalidChannel(u8),

    /// Value that is not a number in range but still unusable.
    #[error("invalid value for '{param}': {reason}")]
    InvalidValue {
        /// Dotted parameter name.
        param: String,
        /// Why the value is unusable.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Collects validation failures.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationError>,
}

impl Validator {
    /// Empty validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `min <= value <= max` (NaN always fails).
    pub fn range(&mut self, param: &str, value: f64, min: f64, max: f64) -> &mut Self {
        if !(value >= min && value <= max) {
            self.errors.push(ValidationError::OutOfRange {
                param: param.to_string(),
                value,
                min,
                max,
            });
        }
        self
    }

    /// Integer variant of [`range`](Self::range).
    pub fn count(&mut self, param: &str, value: usize, min: usize, max: usize) -> &mut Self {
        if value < min || value > max {
            self.errors.push(ValidationError::OutOfRange {
                param: param.to_string(),
                value: value as f64,
                min: min as f64,
                max: max as f64,
            });
        }
        self
    }

    /// Record an arbitrary failure.
    pub fn push(&mut self, error: ValidationError) -> &mut Self {
        self.errors.push(error);
        self
    }

    /// Whether nothing has failed so far.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// One error as itself, several as [`ValidationError::Multiple`].
    pub fn finish(self) -> ValidationResult<()> {
        let mut errors = self.errors;
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}
