//! Engine error types.
//!
//! Every variant describes input rejected at the boundary. Arithmetic inside
//! the engine is total, so there is no error class for it.

use thiserror::Error;

/// Errors raised while validating or scoring exam and practice data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A correct/incorrect count is negative, fractional or not a number.
    #[error("invalid {field} count for {subject}: {value}")]
    InvalidCount {
        subject: String,
        field: &'static str,
        value: f64,
    },

    /// The exam format is not one of the supported variants.
    #[error("unknown exam format: {0}")]
    UnknownFormat(String),

    /// The subject key does not name any known exam subject.
    #[error("unknown subject: {0}")]
    UnknownSubject(String),

    /// The subject exists but is not scored by this format.
    #[error("subject {subject} is not part of the {format} exam")]
    UnsupportedSubject { format: String, subject: String },

    /// A net value handed to the score calculator is negative or not finite.
    #[error("invalid net for {subject}: {value}")]
    InvalidNet { subject: String, value: f64 },

    /// Diploma score outside `[0, 100]`.
    #[error("diploma score must be within [0, 100], got {0}")]
    InvalidDiplomaScore(f64),

    /// Granularity string is not `daily`, `weekly` or `monthly`.
    #[error("unknown granularity: {0}")]
    UnknownGranularity(String),

    /// An aggregated bucket cannot be re-bucketed because its period spans
    /// more than one target period (a week crossing a month boundary, or any
    /// bucket re-bucketed at a finer granularity).
    #[error("bucket {key} spans more than one {granularity} period")]
    BucketSpansPeriods { key: String, granularity: String },
}

impl EngineError {
    /// Returns `true` if the error came from a raw count rather than from a
    /// format or subject lookup.
    pub fn is_count_error(&self) -> bool {
        matches!(self, EngineError::InvalidCount { .. })
    }
}
