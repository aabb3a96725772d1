use thiserror::Error;

/// Usage errors from reference and envelope accessors.
///
/// These are recoverable: a control loop that hits one can skip the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// No reference buffer is bound, or the bound buffer is empty.
    #[error("no reference set")]
    NoReferenceSet,
    /// Input length differs from the bound reference length.
    #[error("size mismatch: reference has {expected} entries, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    /// Element index past the end of the bound reference.
    #[error("index {index} out of range for reference of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Rejections from [`EnvelopeConfig::validate`](crate::EnvelopeConfig::validate) and
/// [`ArrayEnvelopeConfig::validate`](crate::ArrayEnvelopeConfig::validate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite and >= 0 (got {value})")]
    NegativeOrNonFinite { field: &'static str, value: f64 },
    #[error("clamp_min ({min}) exceeds clamp_max ({max})")]
    InvertedClamp { min: f64, max: f64 },
    #[error("violation_timeout must not be NaN")]
    NanTimeout,
    #[error("max_allowed_failure_ratio must be in [0, 1] (got {0})")]
    FailureRatioOutOfRange(f64),
}
