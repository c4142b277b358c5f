// toycar_core/src/types.rs

use nalgebra::Isometry3;
use serde::{Deserialize, Serialize};

use crate::utils::easing::sanitize_axis;

// --- Core Type Aliases ---
/// World pose of a vehicle body. Y is up, the body's forward axis is +Z.
pub type Pose = Isometry3<f64>;

// --- Shared Thresholds ---
/// Throttle magnitude below which the input counts as released.
pub const THROTTLE_DEADZONE: f64 = 0.1;

/// Speed magnitude at or below which the car is considered stationary for steering.
pub const STEER_SPEED_EPSILON: f64 = 0.01;

/// The per-tick control sample consumed by the motion model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriveInput {
    /// -1.0 (full reverse) to 1.0 (full forward).
    #[serde(default)]
    pub throttle: f64,
    /// -1.0 (full left) to 1.0 (full right).
    #[serde(default)]
    pub steer: f64,
    #[serde(default)]
    pub handbrake: bool,
}

impl DriveInput {
    pub const NEUTRAL: Self = Self {
        throttle: 0.0,
        steer: 0.0,
        handbrake: false,
    };

    pub fn new(throttle: f64, steer: f64) -> Self {
        Self {
            throttle,
            steer,
            handbrake: false,
        }
    }

    pub fn with_handbrake(mut self, handbrake: bool) -> Self {
        self.handbrake = handbrake;
        self
    }

    /// Returns a copy with both axes clamped into `[-1, 1]` and NaN zeroed.
    pub fn clamped(&self) -> Self {
        Self {
            throttle: sanitize_axis(self.throttle),
            steer: sanitize_axis(self.steer),
            handbrake: self.handbrake,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.throttle == 0.0 && self.steer == 0.0 && !self.handbrake
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_bounds_axes() {
        let input = DriveInput::new(2.5, f64::NAN).with_handbrake(true).clamped();
        assert_eq!(input.throttle, 1.0);
        assert_eq!(input.steer, 0.0);
        assert!(input.handbrake);
    }

    #[test]
    fn neutral_detection() {
        assert!(DriveInput::NEUTRAL.is_neutral());
        assert!(!DriveInput::new(0.0, 0.2).is_neutral());
        assert!(!DriveInput::default().with_handbrake(true).is_neutral());
    }
}
