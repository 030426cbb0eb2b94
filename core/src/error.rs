// core/src/error.rs
use chrono::NaiveDateTime;
use thiserror::Error;

/// Feiltaksonomi for kjernen. Alle feil propageres til kalleren, ingen retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AltimeterError {
    #[error("pressure out of range (260 hPa < pressure < 1100 hPa): {0}")]
    PressureOutOfRange(f64),
    #[error("altitude out of range (-700 m < altitude < 10000 m): {0}")]
    AltitudeOutOfRange(f64),
    #[error("current pressure {current_p} hPa contradicted by pressure variation {delta_p} hPa (reference {p_ref} hPa)")]
    InconsistentInput {
        p_ref: f64,
        current_p: f64,
        delta_p: f64,
    },
    #[error("missing current pressure or pressure variation")]
    MissingInput,
    #[error("timestamp must be unique, {0} already set")]
    DuplicateTimestamp(NaiveDateTime),
    #[error("no observation at {0}")]
    NotFound(NaiveDateTime),
    #[error("insufficient data for curve fit: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("time and altitude series differ in length ({x} vs {y})")]
    LengthMismatch { x: usize, y: usize },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, AltimeterError>;
