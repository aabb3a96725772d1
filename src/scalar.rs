use std::fmt;

use crate::{envelope_bounds, EnvelopeConfig, Placement, Real, ViolationTimer};

/// Outcome of a scalar envelope check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnvelopeStatus {
    #[default]
    Ok,
    AboveUpperLimit,
    BelowLowerLimit,
    /// Out of band for at least `violation_timeout`. Only returned by `update`.
    ViolationTimeout,
}

impl EnvelopeStatus {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// Whether this is any kind of out-of-band outcome.
    pub fn is_violation(self) -> bool {
        !self.is_ok()
    }
}

impl fmt::Display for EnvelopeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "ok",
            Self::AboveUpperLimit => "above_upper_limit",
            Self::BelowLowerLimit => "below_lower_limit",
            Self::ViolationTimeout => "violation_timeout",
        })
    }
}

impl From<Placement> for EnvelopeStatus {
    fn from(p: Placement) -> Self {
        match p {
            Placement::Inside => Self::Ok,
            Placement::Above => Self::AboveUpperLimit,
            Placement::Below => Self::BelowLowerLimit,
        }
    }
}

/// Envelope checker for a single reference value.
///
/// `check` answers "is this sample in range"; `update` answers "how long has it been
/// out of range". Callers drive them at their own cadence.
///
/// ```rust
/// use envelope_monitor::{EnvelopeChecker, EnvelopeConfig, EnvelopeStatus};
///
/// let mut c = EnvelopeChecker::new(EnvelopeConfig::absolute(10.0, 10.0).with_violation_timeout(5.0));
/// c.set_reference(100.0);
/// assert_eq!(c.check(111.0), EnvelopeStatus::AboveUpperLimit);
/// assert_eq!(c.update(3.0), EnvelopeStatus::AboveUpperLimit);
/// assert_eq!(c.update(3.0), EnvelopeStatus::ViolationTimeout);
/// assert_eq!(c.check(105.0), EnvelopeStatus::Ok);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeChecker<T> {
    config: EnvelopeConfig<T>,
    reference: T,
    timer: ViolationTimer<T>,
    last_status: EnvelopeStatus,
}

impl<T: Real> Default for EnvelopeChecker<T> {
    fn default() -> Self {
        Self::new(EnvelopeConfig::default())
    }
}

impl<T: Real> EnvelopeChecker<T> {
    /// Create a checker with reference `0`.
    pub fn new(config: EnvelopeConfig<T>) -> Self {
        Self {
            config,
            reference: T::ZERO,
            timer: ViolationTimer::default(),
            last_status: EnvelopeStatus::Ok,
        }
    }

    pub fn config(&self) -> &EnvelopeConfig<T> {
        &self.config
    }

    /// Replace the configuration. Reference, status and timer are kept.
    pub fn set_config(&mut self, config: EnvelopeConfig<T>) {
        self.config = config;
    }

    pub fn reference(&self) -> T {
        self.reference
    }

    /// Replace the reference and start over: timer to zero, status to `Ok`.
    pub fn set_reference(&mut self, reference: T) {
        self.reference = reference;
        self.timer.reset();
        self.last_status = EnvelopeStatus::Ok;
    }

    /// Classify `value` against the current envelope and store the result.
    ///
    /// The violation timer is not touched.
    pub fn check(&mut self, value: T) -> EnvelopeStatus {
        let placement = envelope_bounds(self.reference, &self.config).classify(value);
        let status = EnvelopeStatus::from(placement);
        if status != self.last_status {
            tracing::debug!(
                from = %self.last_status,
                to = %status,
                ?value,
                reference = ?self.reference,
                "scalar envelope status changed"
            );
        }
        self.last_status = status;
        status
    }

    /// Advance the violation timer by `dt`.
    ///
    /// Returns `ViolationTimeout` once the accumulated time reaches the configured
    /// timeout, without overwriting the stored status; otherwise the stored status.
    pub fn update(&mut self, dt: T) -> EnvelopeStatus {
        let violating = self.last_status.is_violation();
        if self.timer.advance(violating, dt, self.config.violation_timeout) {
            tracing::warn!(
                elapsed = ?self.timer.elapsed(),
                timeout = ?self.config.violation_timeout,
                status = %self.last_status,
                "scalar envelope violation timed out"
            );
            return EnvelopeStatus::ViolationTimeout;
        }
        self.last_status
    }

    /// Current `(lower, upper)` envelope.
    pub fn envelope_bounds(&self) -> (T, T) {
        let b = envelope_bounds(self.reference, &self.config);
        (b.lower, b.upper)
    }

    /// Status stored by the last `check` (or `Ok` after `set_reference`).
    pub fn status(&self) -> EnvelopeStatus {
        self.last_status
    }

    pub fn violation_timer(&self) -> T {
        self.timer.elapsed()
    }
}
