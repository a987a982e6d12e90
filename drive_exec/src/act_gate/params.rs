//! Parameters structure for ActGate

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::ActGateError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the actuation gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- PWM MAPPING ----
    /// Minimum logical intent
    pub in_min: i64,

    /// Maximum logical intent
    pub in_max: i64,

    /// PWM value of `in_min`
    pub out_min: i64,

    /// PWM value of `in_max`
    pub out_max: i64,

    /// Range the truncated autonomous steering command is clamped into before mapping.
    pub auto_steer_min: i64,
    pub auto_steer_max: i64,

    // ---- SAFETY ----
    /// Obstacles closer than this force a neutral throttle.
    ///
    /// Units: meters
    pub safe_distance_m: f64,

    /// Time a stop sign holds the vehicle for.
    ///
    /// Units: seconds
    pub stop_sign_dwell_s: f64,

    /// Stop signs seen within this time of the last honoured one are ignored.
    ///
    /// Units: seconds
    pub stop_sign_ignore_s: f64,
}

impl Params {
    /// Check that the mapping ranges are usable.
    pub fn validate(&self) -> Result<(), ActGateError> {
        if self.in_min >= self.in_max {
            return Err(ActGateError::InvalidInputRange(self.in_min, self.in_max));
        }

        let i16_range = i16::MIN as i64..=i16::MAX as i64;
        if self.out_min >= self.out_max
            || !i16_range.contains(&self.out_min)
            || !i16_range.contains(&self.out_max)
        {
            return Err(ActGateError::InvalidOutputRange(self.out_min, self.out_max));
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            in_min: -100,
            in_max: 100,
            out_min: 6554,
            out_max: 13108,
            auto_steer_min: -100,
            auto_steer_max: 99,
            safe_distance_m: 0.5,
            stop_sign_dwell_s: 1.5,
            stop_sign_ignore_s: 5.0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(Params::default().validate().is_ok());

        let bad_in = Params {
            in_min: 100,
            in_max: -100,
            ..Default::default()
        };
        assert!(matches!(
            bad_in.validate(),
            Err(ActGateError::InvalidInputRange(100, -100))
        ));

        let bad_out = Params {
            out_max: 40_000,
            ..Default::default()
        };
        assert!(bad_out.validate().is_err());
    }
}
