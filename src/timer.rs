use crate::Real;

/// Accumulated time spent in an unbroken run of violations.
///
/// Shared by both checkers so scalar and array escalation behave identically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViolationTimer<T> {
    elapsed: T,
}

impl<T: Real> Default for ViolationTimer<T> {
    fn default() -> Self {
        Self { elapsed: T::ZERO }
    }
}

impl<T: Real> ViolationTimer<T> {
    pub fn elapsed(&self) -> T {
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.elapsed = T::ZERO;
    }

    /// Advance by `dt` and report whether `timeout` has been reached.
    ///
    /// A run that is not in violation resets the timer and never times out. A
    /// `timeout <= 0` disables escalation but time still accumulates.
    pub fn advance(&mut self, in_violation: bool, dt: T, timeout: T) -> bool {
        if !in_violation {
            self.elapsed = T::ZERO;
            return false;
        }
        self.elapsed += dt;
        timeout > T::ZERO && self.elapsed >= timeout
    }
}
