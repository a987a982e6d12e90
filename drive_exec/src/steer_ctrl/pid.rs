//! Fixed timestep PID controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller evaluated at a fixed rate.
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Time between evaluations
    ///
    /// Units: seconds
    dt_s: f64,

    state: PidState,
}

/// The memory of a [`PidController`].
#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq)]
pub struct PidState {
    /// Previous error
    pub prev_error: f64,

    /// The integral accumulation
    pub integral: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains, evaluated every `dt_s` seconds.
    pub fn new(k_p: f64, k_i: f64, k_d: f64, dt_s: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            dt_s,
            state: PidState::default(),
        }
    }

    /// Get the value of the controller for the given error.
    pub fn get(&mut self, error: f64) -> f64 {
        self.state.integral += error * self.dt_s;
        let derivative = (error - self.state.prev_error) / self.dt_s;
        self.state.prev_error = error;

        self.k_p * error + self.k_i * self.state.integral + self.k_d * derivative
    }

    /// Clear the controller's memory.
    pub fn reset(&mut self) {
        self.state = PidState::default();
    }

    pub fn state(&self) -> PidState {
        self.state
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pid() {
        let mut pid = PidController::new(0.15, 0.0, 0.01, 0.05);

        // First step: derivative taken from a zero previous error
        let out = pid.get(-10.0);
        assert!((out - (0.15 * -10.0 + 0.01 * -200.0)).abs() < 1e-9);

        // Constant error, no derivative
        let out = pid.get(-10.0);
        assert!((out - -1.5).abs() < 1e-9);

        assert_eq!(pid.state().prev_error, -10.0);
        assert!((pid.state().integral - -1.0).abs() < 1e-9);

        pid.reset();
        assert_eq!(pid.state(), PidState::default());
    }

    #[test]
    fn test_integral() {
        let mut pid = PidController::new(0.0, 2.0, 0.0, 0.5);

        pid.get(1.0);
        let out = pid.get(1.0);
        assert!((out - 2.0).abs() < 1e-9);
    }
}
