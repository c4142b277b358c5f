// toycar_core/src/models/motion/wheels.rs

use serde::{Deserialize, Serialize};

use super::drift::FrictionState;
use super::params::WheelParams;
use crate::types::{DriveInput, THROTTLE_DEADZONE};

/// Actuation for the powered and steering wheel colliders of one car.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelCommands {
    /// Applied to every powered wheel. Negative drives backwards.
    pub motor_torque: f64,
    pub brake_torque: f64,
    /// Applied to every steering wheel, deg.
    pub steer_angle_deg: f64,
    pub sideways_stiffness: f64,
}

/// Derives the wheel commands for one tick.
///
/// The steer angle follows the input directly, even at standstill; only the
/// body's heading change is gated by speed.
pub fn wheel_commands(
    input: &DriveInput,
    friction: &FrictionState,
    params: &WheelParams,
    max_steering_angle: f64,
) -> WheelCommands {
    let (motor_torque, mut brake_torque) = if input.throttle > THROTTLE_DEADZONE {
        (params.motor_torque, 0.0)
    } else if input.throttle < -THROTTLE_DEADZONE {
        (-params.motor_torque * params.reverse_torque_factor, 0.0)
    } else {
        (0.0, params.brake_force * params.coast_brake_factor)
    };

    if friction.full_brake {
        brake_torque = params.brake_force;
    }

    WheelCommands {
        motor_torque,
        brake_torque,
        steer_angle_deg: input.steer * max_steering_angle,
        sideways_stiffness: friction.sideways_stiffness,
    }
}
