//! Margin policy: how far the envelope extends from a reference value.
//!
//! Both checkers derive their bounds through [`envelope_bounds`], so a given
//! `(reference, config)` pair always yields the same envelope whether it is checked
//! as a scalar or as one element of an array.

use crate::{ConfigError, Real};

/// How `margin_upper` / `margin_lower` are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarginMode {
    /// Margins are distances in measurement units.
    #[default]
    Absolute,
    /// Margins are percentages of `|reference|`.
    Percent,
}

/// Envelope configuration shared by the scalar and array checkers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvelopeConfig<T> {
    pub mode: MarginMode,
    /// Nominal distance (or percent) above the reference.
    pub margin_upper: T,
    /// Nominal distance (or percent) below the reference.
    pub margin_lower: T,
    /// Floor applied to every computed margin, in both modes.
    pub min_margin: T,
    /// The lower bound never goes below this.
    pub clamp_min: T,
    /// The upper bound never goes above this.
    pub clamp_max: T,
    /// Accumulated out-of-band time before `update` escalates.
    ///
    /// `0` or negative disables escalation.
    pub violation_timeout: T,
}

impl<T: Real> Default for EnvelopeConfig<T> {
    fn default() -> Self {
        Self {
            mode: MarginMode::Absolute,
            margin_upper: T::ZERO,
            margin_lower: T::ZERO,
            min_margin: T::ZERO,
            clamp_min: T::LOWEST,
            clamp_max: T::HIGHEST,
            violation_timeout: T::ZERO,
        }
    }
}

impl<T: Real> EnvelopeConfig<T> {
    /// Absolute margins, no clamp, no timeout.
    pub fn absolute(margin_upper: T, margin_lower: T) -> Self {
        Self {
            mode: MarginMode::Absolute,
            margin_upper,
            margin_lower,
            ..Self::default()
        }
    }

    /// Percent-of-reference margins, no clamp, no timeout.
    ///
    /// `EnvelopeConfig::percent(5.0, 5.0)` around a reference of `200.0` is `[190, 210]`.
    pub fn percent(margin_upper: T, margin_lower: T) -> Self {
        Self {
            mode: MarginMode::Percent,
            margin_upper,
            margin_lower,
            ..Self::default()
        }
    }

    pub fn with_min_margin(mut self, min_margin: T) -> Self {
        self.min_margin = min_margin;
        self
    }

    pub fn with_clamp(mut self, clamp_min: T, clamp_max: T) -> Self {
        self.clamp_min = clamp_min;
        self.clamp_max = clamp_max;
        self
    }

    pub fn with_violation_timeout(mut self, violation_timeout: T) -> Self {
        self.violation_timeout = violation_timeout;
        self
    }

    /// Whether `update` can ever return a timeout.
    pub fn timeout_enabled(&self) -> bool {
        self.violation_timeout > T::ZERO
    }

    /// Check the configuration invariants.
    ///
    /// Checkers accept any configuration; this is for callers that want to reject a
    /// bad config when loading it rather than get a degenerate envelope later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("margin_upper", self.margin_upper),
            ("margin_lower", self.margin_lower),
            ("min_margin", self.min_margin),
        ] {
            if !value.is_finite() || value < T::ZERO {
                return Err(ConfigError::NegativeOrNonFinite {
                    field,
                    value: value.to_f64(),
                });
            }
        }
        // Written as a negation so NaN bounds are rejected too.
        if !(self.clamp_min <= self.clamp_max) {
            return Err(ConfigError::InvertedClamp {
                min: self.clamp_min.to_f64(),
                max: self.clamp_max.to_f64(),
            });
        }
        if self.violation_timeout.is_nan() {
            return Err(ConfigError::NanTimeout);
        }
        Ok(())
    }
}

/// Effective margin for `reference` given a nominal margin.
///
/// - `Percent`: `max(|reference| * nominal / 100, min_margin)`
/// - `Absolute`: `max(nominal, min_margin)`
///
/// ```rust
/// use envelope_monitor::{compute_margin, EnvelopeConfig};
///
/// let cfg = EnvelopeConfig::percent(5.0, 5.0).with_min_margin(1.0);
/// assert_eq!(compute_margin(200.0, 5.0, &cfg), 10.0);
/// assert_eq!(compute_margin(2.0, 5.0, &cfg), 1.0);
/// ```
#[inline]
pub fn compute_margin<T: Real>(reference: T, nominal: T, cfg: &EnvelopeConfig<T>) -> T {
    let raw = match cfg.mode {
        MarginMode::Percent => reference.abs() * nominal / T::HUNDRED,
        MarginMode::Absolute => nominal,
    };
    raw.max_of(cfg.min_margin)
}

/// Where a value sits relative to its envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Inside,
    Above,
    Below,
}

/// A closed `[lower, upper]` envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds<T> {
    pub lower: T,
    pub upper: T,
}

impl<T: Real> Bounds<T> {
    #[inline]
    pub fn classify(&self, value: T) -> Placement {
        if value > self.upper {
            Placement::Above
        } else if value < self.lower {
            Placement::Below
        } else {
            Placement::Inside
        }
    }

    #[inline]
    pub fn contains(&self, value: T) -> bool {
        self.classify(value) == Placement::Inside
    }
}

/// Envelope around `reference`: margins first, then the global clamp.
///
/// The clamp is applied last, so `lower >= clamp_min` and `upper <= clamp_max` hold
/// for any margin configuration.
#[inline]
pub fn envelope_bounds<T: Real>(reference: T, cfg: &EnvelopeConfig<T>) -> Bounds<T> {
    let up = compute_margin(reference, cfg.margin_upper, cfg);
    let down = compute_margin(reference, cfg.margin_lower, cfg);
    Bounds {
        lower: (reference - down).max_of(cfg.clamp_min),
        upper: (reference + up).min_of(cfg.clamp_max),
    }
}
