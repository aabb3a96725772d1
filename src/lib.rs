//! `envelope-monitor`: tolerance-envelope checks for live measurements.
//!
//! Given a measurement (a scalar, or an array such as a spectrum or a sampled curve)
//! and a reference, decide whether the measurement lies inside a configurable band
//! around the reference and, if not, for how long it has stayed outside.
//!
//! Typical uses: pass/fail gating of test-equipment readings against a reference
//! curve, or sanity checks on a control loop's measured output.
//!
//! **Pieces:**
//! - [`compute_margin`] / [`envelope_bounds`]: the margin policy. Margins are either
//!   absolute or a percentage of `|reference|`, floored at `min_margin`, and the
//!   resulting envelope is clamped to `[clamp_min, clamp_max]`.
//! - [`EnvelopeChecker`]: one reference value, one live value per `check`.
//! - [`ArrayEnvelopeChecker`]: a borrowed reference array, element-wise envelopes,
//!   and a batch decision that tolerates a configured fraction of failing elements.
//!
//! Both checkers separate the instantaneous question (`check`) from the
//! time-integrated one (`update`): `update(dt)` accumulates time while the last
//! `check` was out of band and reports a timeout status once `violation_timeout` is
//! reached.
//!
//! ```rust
//! use envelope_monitor::{EnvelopeChecker, EnvelopeConfig, EnvelopeStatus};
//!
//! let cfg = EnvelopeConfig::percent(5.0, 5.0).with_clamp(0.0, 1_000.0);
//! let mut c = EnvelopeChecker::new(cfg);
//! c.set_reference(200.0);
//! assert_eq!(c.envelope_bounds(), (190.0, 210.0));
//! assert_eq!(c.check(211.0), EnvelopeStatus::AboveUpperLimit);
//! ```
//!
//! **Errors:** usage mistakes (no reference bound, length mismatches) come back as
//! values: [`EnvelopeArrayStatus::NoReferenceSet`] / [`EnvelopeArrayStatus::SizeMismatch`]
//! from `check`, [`EnvelopeError`] from the other fallible calls. Nothing panics.
//!
//! **Logging:** status transitions are emitted at `debug` and timeout escalations at
//! `warn` through `tracing`. Install a subscriber to see them.
//!
//! **Non-goals:**
//! - No acquisition of the measurement stream; callers supply values and `dt`.
//! - No alert delivery.
//! - No modeling of the reference signal.
//! - No internal locking: one checker per channel, driven by one loop.

#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod real;
pub use real::*;

mod margin;
pub use margin::*;

mod timer;
pub use timer::*;

mod scalar;
pub use scalar::*;

mod array;
pub use array::*;

pub const ENVELOPE_MONITOR_VERSION: &str = env!("CARGO_PKG_VERSION");
