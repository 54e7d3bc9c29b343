//! Validation of configuration values.
//!
//! Each check appends to a list so that one pass reports every problem in a
//! file, not just the first. [`collect`] folds the list into a single
//! [`ValidationError`].
//!
//! # Example
//!
//! ```rust
//! use lamb_config::validation::{ValidationError, check_range, collect};
//!
//! let mut errors = Vec::new();
//! check_range("duty", 1.5, 0.0, 1.0, &mut errors);
//! check_range("frequency", 2.0, 0.05, 2000.0, &mut errors);
//!
//! assert!(matches!(collect(errors), Err(ValidationError::OutOfRange { .. })));
//! ```

use lamb_core::{ClockRatio, FrequencyRange, LfoShape, NUM_STEPS, SequenceKind, TriggerMode};
use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Numeric value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Sequence name not in the table.
    #[error("unknown sequence: {0}")]
    UnknownSequence(String),

    /// Clock ratio label not one of the 17 ratios.
    #[error("unknown clock ratio: {0}")]
    UnknownRatio(String),

    /// String setting outside its fixed set of choices.
    #[error("invalid value '{value}' for '{param}', expected {expected}")]
    InvalidChoice {
        /// Name of the parameter.
        param: String,
        /// The rejected value.
        value: String,
        /// Human-readable list of accepted values.
        expected: &'static str,
    },

    /// Skip mask with the wrong number of entries.
    #[error("skip mask must have 8 entries, got {0}")]
    BadSkipLength(usize),

    /// More LFO sections than the module has channels.
    #[error("at most {max} LFOs are supported, got {count}")]
    TooManyLfos {
        /// Number of LFO sections found.
        count: usize,
        /// Number of channels available.
        max: usize,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Fold collected errors: none is `Ok`, one is itself, more are
/// [`ValidationError::Multiple`].
pub fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Record an error if `value` is outside `[min, max]` or not finite.
pub fn check_range(
    param: &str,
    value: f64,
    min: f64,
    max: f64,
    errors: &mut Vec<ValidationError>,
) {
    if !(value.is_finite() && value >= min && value <= max) {
        errors.push(ValidationError::OutOfRange {
            param: param.to_string(),
            value,
            min,
            max,
        });
    }
}

/// Parse a waveform shape name (`square` or `triangle`).
pub fn parse_shape(param: &str, value: &str) -> ValidationResult<LfoShape> {
    match value.trim().to_ascii_lowercase().as_str() {
        "square" => Ok(LfoShape::Square),
        "triangle" => Ok(LfoShape::Triangle),
        _ => Err(invalid_choice(param, value, "\"square\" or \"triangle\"")),
    }
}

/// Parse a RANGE switch name (`low` or `high`).
pub fn parse_range(param: &str, value: &str) -> ValidationResult<FrequencyRange> {
    match value.trim().to_ascii_lowercase().as_str() {
        "low" => Ok(FrequencyRange::Low),
        "high" => Ok(FrequencyRange::High),
        _ => Err(invalid_choice(param, value, "\"low\" or \"high\"")),
    }
}

/// Parse a trigger source name (`internal` or `gate`).
pub fn parse_trigger(param: &str, value: &str) -> ValidationResult<TriggerMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "internal" => Ok(TriggerMode::Internal),
        "gate" => Ok(TriggerMode::Gate),
        _ => Err(invalid_choice(param, value, "\"internal\" or \"gate\"")),
    }
}

/// Parse a clock ratio label such as `x2` or `/3`.
pub fn parse_ratio(value: &str) -> ValidationResult<ClockRatio> {
    ClockRatio::from_label(value).ok_or_else(|| ValidationError::UnknownRatio(value.to_string()))
}

/// Parse a sequence by name (`up/down`, `+2-1`, ...) or selector ordinal.
pub fn parse_sequence(value: &str) -> ValidationResult<SequenceKind> {
    SequenceKind::from_name(value)
        .or_else(|| {
            value
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(SequenceKind::from_index)
        })
        .ok_or_else(|| ValidationError::UnknownSequence(value.to_string()))
}

/// Convert a skip list into a fixed mask.
pub fn parse_skip(skip: &[bool]) -> ValidationResult<[bool; NUM_STEPS]> {
    <[bool; NUM_STEPS]>::try_from(skip).map_err(|_| ValidationError::BadSkipLength(skip.len()))
}

fn invalid_choice(param: &str, value: &str, expected: &'static str) -> ValidationError {
    ValidationError::InvalidChoice {
        param: param.to_string(),
        value: value.to_string(),
        expected,
    }
}
