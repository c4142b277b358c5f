// toycar_core/src/models/motion/state.rs

use serde::{Deserialize, Serialize};

/// Phase of the drift state machine.
///
/// The phase follows the drift trigger, which switches the tyre effects on. Grip
/// loss is tracked separately in `VehicleState::sliding`.
///
/// `FadingOut` only occurs with a `SmokeFade::FadeOut` policy: the trigger has
/// released, but the tyre smoke keeps running until `remaining` hits zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DriftPhase {
    #[default]
    Normal,
    Drifting,
    FadingOut {
        remaining: f64,
        /// Smoke intensity on the last drifting tick, scaled down over the fade.
        intensity: f64,
    },
}

impl DriftPhase {
    /// Whether the drift trigger holds.
    pub fn is_drifting(&self) -> bool {
        matches!(self, DriftPhase::Drifting)
    }

    /// Whether tyre smoke should be emitted.
    pub fn is_emitting(&self) -> bool {
        !matches!(self, DriftPhase::Normal)
    }
}

/// The mutable per-vehicle state owned by `VehicleMotionModel`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleState {
    /// Signed, positive = forward.
    pub forward_speed: f64,
    /// Yaw about the up axis in degrees, `(-180, 180]`.
    pub heading_deg: f64,
    /// Cosmetic front wheel angle in degrees.
    pub steer_angle_deg: f64,
    pub is_reversing: bool,
    pub drift: DriftPhase,
    /// Whether the tyres lost grip on the last applied tick.
    pub sliding: bool,
    /// Smoke intensity of the last drifting tick, carried into a fade.
    pub smoke_intensity: f64,
    /// Accumulated wheel roll in degrees, `[0, 360)`.
    pub wheel_spin_deg: f64,
    /// Heading change of the last applied tick, deg/s.
    pub yaw_rate_deg: f64,
}

impl VehicleState {
    pub fn with_heading(heading_deg: f64) -> Self {
        Self {
            heading_deg,
            ..Self::default()
        }
    }

    pub fn is_drifting(&self) -> bool {
        self.drift.is_drifting()
    }
}
