//! Batch envelope checks against a caller-owned reference curve.
//!
//! The checker borrows the reference buffer instead of copying it: a spectrum mask
//! or calibration curve can be thousands of bins long and is usually owned by the
//! surrounding acquisition code. The borrow is `&'a mut` so that
//! [`ArrayEnvelopeChecker::set_reference_values`] can rewrite it in place, and so
//! nothing else can mutate it while a check reads it.

use std::fmt;

use crate::{
    envelope_bounds, ConfigError, EnvelopeConfig, EnvelopeError, Placement, Real, ViolationTimer,
};

/// Configuration for [`ArrayEnvelopeChecker`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrayEnvelopeConfig<T> {
    /// Per-element envelope parameters.
    pub base: EnvelopeConfig<T>,
    /// Fraction of elements allowed out of band before the batch fails.
    ///
    /// `0.1` tolerates up to 10%. The batch fails only when the ratio is strictly
    /// greater than this.
    pub max_allowed_failure_ratio: f64,
}

impl<T: Real> Default for ArrayEnvelopeConfig<T> {
    fn default() -> Self {
        Self {
            base: EnvelopeConfig::default(),
            max_allowed_failure_ratio: 0.0,
        }
    }
}

impl<T: Real> ArrayEnvelopeConfig<T> {
    pub fn new(base: EnvelopeConfig<T>, max_allowed_failure_ratio: f64) -> Self {
        Self {
            base,
            max_allowed_failure_ratio,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base.validate()?;
        let r = self.max_allowed_failure_ratio;
        if !(0.0..=1.0).contains(&r) {
            return Err(ConfigError::FailureRatioOutOfRange(r));
        }
        Ok(())
    }
}

/// Outcome of a batch envelope check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnvelopeArrayStatus {
    #[default]
    Ok,
    /// Too many elements out of band, with "above" the majority (or tied).
    AnyAboveUpperLimit,
    /// Too many elements out of band, with "below" the strict majority.
    AnyBelowLowerLimit,
    /// Failing for at least `violation_timeout`. Only returned by `update`.
    ViolationTimeout,
    /// No reference is bound, or it is empty.
    NoReferenceSet,
    /// Sample length differs from the reference length.
    SizeMismatch,
}

impl EnvelopeArrayStatus {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// Usage errors, as opposed to measurement outcomes.
    pub fn is_usage_error(self) -> bool {
        matches!(self, Self::NoReferenceSet | Self::SizeMismatch)
    }
}

impl fmt::Display for EnvelopeArrayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "ok",
            Self::AnyAboveUpperLimit => "any_above_upper_limit",
            Self::AnyBelowLowerLimit => "any_below_lower_limit",
            Self::ViolationTimeout => "violation_timeout",
            Self::NoReferenceSet => "no_reference_set",
            Self::SizeMismatch => "size_mismatch",
        })
    }
}

impl From<EnvelopeError> for EnvelopeArrayStatus {
    fn from(e: EnvelopeError) -> Self {
        match e {
            EnvelopeError::NoReferenceSet => Self::NoReferenceSet,
            EnvelopeError::SizeMismatch { .. } | EnvelopeError::IndexOutOfRange { .. } => {
                Self::SizeMismatch
            }
        }
    }
}

/// Envelope checker over a borrowed reference array.
///
/// ```rust
/// use envelope_monitor::{ArrayEnvelopeChecker, ArrayEnvelopeConfig, EnvelopeArrayStatus, EnvelopeConfig};
///
/// let mut reference = [10.0, 20.0, 30.0, 40.0];
/// let cfg = ArrayEnvelopeConfig::new(EnvelopeConfig::absolute(1.0, 1.0), 0.2);
/// let mut c = ArrayEnvelopeChecker::new(cfg);
/// c.bind_reference_buffer(&mut reference);
///
/// assert_eq!(c.check(&[12.0, 20.0, 30.0, 40.0]), EnvelopeArrayStatus::AnyAboveUpperLimit);
/// assert_eq!(c.counts(), (1, 0));
/// assert_eq!(c.check(&[12.0, 20.0, 30.0]), EnvelopeArrayStatus::SizeMismatch);
/// ```
#[derive(Debug)]
pub struct ArrayEnvelopeChecker<'a, T> {
    config: ArrayEnvelopeConfig<T>,
    reference: Option<&'a mut [T]>,
    timer: ViolationTimer<T>,
    above: usize,
    below: usize,
    last_status: EnvelopeArrayStatus,
}

impl<T: Real> Default for ArrayEnvelopeChecker<'_, T> {
    fn default() -> Self {
        Self::new(ArrayEnvelopeConfig::default())
    }
}

impl<'a, T: Real> ArrayEnvelopeChecker<'a, T> {
    /// Create a checker with no reference bound.
    pub fn new(config: ArrayEnvelopeConfig<T>) -> Self {
        Self {
            config,
            reference: None,
            timer: ViolationTimer::default(),
            above: 0,
            below: 0,
            last_status: EnvelopeArrayStatus::Ok,
        }
    }

    pub fn config(&self) -> &ArrayEnvelopeConfig<T> {
        &self.config
    }

    /// Replace the configuration. Reference, status and timer are kept.
    pub fn set_config(&mut self, config: ArrayEnvelopeConfig<T>) {
        self.config = config;
    }

    /// Use `buffer` as the reference curve without copying it.
    ///
    /// The buffer length becomes the length every sample must match. Status, counts
    /// and timer start over. Any previously bound buffer is released.
    pub fn bind_reference_buffer(&mut self, buffer: &'a mut [T]) {
        tracing::debug!(len = buffer.len(), "bound envelope reference buffer");
        self.reference = Some(buffer);
        self.reset_state();
    }

    /// Release the bound buffer, handing the borrow back.
    pub fn unbind_reference_buffer(&mut self) -> Option<&'a mut [T]> {
        self.reset_state();
        self.reference.take()
    }

    /// The bound reference, if any.
    pub fn reference_values(&self) -> Option<&[T]> {
        self.reference.as_deref()
    }

    /// Length of the bound reference (`0` when unbound).
    pub fn len(&self) -> usize {
        self.reference.as_deref().map_or(0, <[T]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounds-checked read of one reference element.
    pub fn reference_value(&self, index: usize) -> Option<T> {
        self.reference.as_deref()?.get(index).copied()
    }

    /// Bounds-checked write of one reference element.
    pub fn set_reference_value(&mut self, index: usize, value: T) -> Result<(), EnvelopeError> {
        let buf = self.reference.as_deref_mut().ok_or(EnvelopeError::NoReferenceSet)?;
        let len = buf.len();
        let slot = buf
            .get_mut(index)
            .ok_or(EnvelopeError::IndexOutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Copy `values` into the bound buffer.
    ///
    /// The buffer is left untouched when the lengths differ. On success status and
    /// timer start over, as with a scalar reference change.
    pub fn set_reference_values(&mut self, values: &[T]) -> Result<(), EnvelopeError> {
        let buf = self.reference.as_deref_mut().ok_or(EnvelopeError::NoReferenceSet)?;
        if buf.len() != values.len() {
            return Err(EnvelopeError::SizeMismatch {
                expected: buf.len(),
                actual: values.len(),
            });
        }
        buf.copy_from_slice(values);
        self.reset_state();
        Ok(())
    }

    /// Check a whole sample against the per-element envelopes.
    ///
    /// Usage errors (`NoReferenceSet`, `SizeMismatch`) are returned without touching
    /// the stored status, counts or timer, so a caller can skip the cycle.
    pub fn check(&mut self, sample: &[T]) -> EnvelopeArrayStatus {
        let reference = match self.matched_reference(sample.len()) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, "envelope array check rejected");
                return e.into();
            }
        };

        let cfg = &self.config.base;
        let mut above = 0usize;
        let mut below = 0usize;
        for (&r, &v) in reference.iter().zip(sample) {
            match envelope_bounds(r, cfg).classify(v) {
                Placement::Above => above += 1,
                Placement::Below => below += 1,
                Placement::Inside => {}
            }
        }

        let fail_ratio = (above + below) as f64 / sample.len() as f64;
        let status = if fail_ratio > self.config.max_allowed_failure_ratio {
            if above >= below {
                EnvelopeArrayStatus::AnyAboveUpperLimit
            } else {
                EnvelopeArrayStatus::AnyBelowLowerLimit
            }
        } else {
            EnvelopeArrayStatus::Ok
        };

        if status != self.last_status {
            tracing::debug!(
                from = %self.last_status,
                to = %status,
                above,
                below,
                fail_ratio,
                "envelope array status changed"
            );
        }
        self.above = above;
        self.below = below;
        self.last_status = status;
        status
    }

    /// Indices of every out-of-band element, in order.
    ///
    /// Independent of the failure-ratio threshold, so it is useful even when the
    /// batch as a whole passes.
    pub fn failed_bin_indices(&self, sample: &[T]) -> Result<Vec<usize>, EnvelopeError> {
        let reference = self.matched_reference(sample.len())?;
        let cfg = &self.config.base;
        Ok(reference
            .iter()
            .zip(sample)
            .enumerate()
            .filter_map(|(i, (&r, &v))| (!envelope_bounds(r, cfg).contains(v)).then_some(i))
            .collect())
    }

    /// Fill `out_high` / `out_low` with the per-element envelope.
    ///
    /// Neither output is written unless both match the reference length.
    pub fn envelope(&self, out_high: &mut [T], out_low: &mut [T]) -> Result<(), EnvelopeError> {
        let reference = self.matched_reference(out_high.len())?;
        if out_low.len() != reference.len() {
            return Err(EnvelopeError::SizeMismatch {
                expected: reference.len(),
                actual: out_low.len(),
            });
        }
        let cfg = &self.config.base;
        for ((&r, hi), lo) in reference.iter().zip(out_high.iter_mut()).zip(out_low.iter_mut()) {
            let b = envelope_bounds(r, cfg);
            *hi = b.upper;
            *lo = b.lower;
        }
        Ok(())
    }

    /// `(above / n, below / n)` from the last successful `check`.
    ///
    /// `(0, 0)` when no reference is bound.
    pub fn failure_ratio(&self) -> (f64, f64) {
        let n = self.len();
        if n == 0 {
            return (0.0, 0.0);
        }
        let n = n as f64;
        (self.above as f64 / n, self.below as f64 / n)
    }

    /// Raw `(above, below)` counts from the last successful `check`.
    pub fn counts(&self) -> (usize, usize) {
        (self.above, self.below)
    }

    /// Advance the violation timer by `dt`; same rules as the scalar checker.
    pub fn update(&mut self, dt: T) -> EnvelopeArrayStatus {
        let violating = !self.last_status.is_ok();
        if self.timer.advance(violating, dt, self.config.base.violation_timeout) {
            tracing::warn!(
                elapsed = ?self.timer.elapsed(),
                timeout = ?self.config.base.violation_timeout,
                status = %self.last_status,
                above = self.above,
                below = self.below,
                "envelope array violation timed out"
            );
            return EnvelopeArrayStatus::ViolationTimeout;
        }
        self.last_status
    }

    pub fn status(&self) -> EnvelopeArrayStatus {
        self.last_status
    }

    pub fn violation_timer(&self) -> T {
        self.timer.elapsed()
    }

    fn reset_state(&mut self) {
        self.timer.reset();
        self.above = 0;
        self.below = 0;
        self.last_status = EnvelopeArrayStatus::Ok;
    }

    /// The bound reference, provided it is non-empty and `len` long.
    fn matched_reference(&self, len: usize) -> Result<&[T], EnvelopeError> {
        let reference = match self.reference.as_deref() {
            Some(r) if !r.is_empty() => r,
            _ => return Err(EnvelopeError::NoReferenceSet),
        };
        if reference.len() != len {
            return Err(EnvelopeError::SizeMismatch {
                expected: reference.len(),
                actual: len,
            });
        }
        Ok(reference)
    }
}
