// toycar_core/src/models/motion/params.rs

//! Tuning parameters for the vehicle motion model.
//!
//! A single `MotionParams` replaces the per-controller constants of the arcade,
//! RC and wheel-collider cars. The named presets reproduce their reference tuning.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the throttle magnitude maps to the target speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ThrottleResponse {
    /// Target speed is `max * throttle`.
    #[default]
    Proportional,
    /// Any throttle past the deadzone targets the full speed for its direction.
    Full,
}

/// How speed decays when the throttle is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CoastCurve {
    /// `lerp(speed, 0, deceleration * dt)`.
    #[default]
    Exponential,
    /// `move_towards(speed, 0, deceleration * dt)`.
    Linear,
}

/// The condition that puts the car into the drift state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "PascalCase")]
pub enum DriftTrigger {
    /// Drift exactly while the handbrake is held.
    Handbrake,
    /// Drift while the cosmetic steer angle (deg) and the speed both exceed their thresholds.
    SteerAndSpeed { min_steer_angle: f64, min_speed: f64 },
    /// Drift while the handbrake is held, or while yawing fast (deg/s) above a speed.
    HandbrakeOrYawRate { min_yaw_rate: f64, min_speed: f64 },
}

impl Default for DriftTrigger {
    fn default() -> Self {
        DriftTrigger::Handbrake
    }
}

/// What happens to the smoke once the drift trigger stops holding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "PascalCase")]
pub enum SmokeFade {
    /// Emission stops on the same tick.
    Instant,
    /// Emission keeps running for `duration` seconds.
    FadeOut { duration: f64 },
}

impl Default for SmokeFade {
    fn default() -> Self {
        SmokeFade::Instant
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriftParams {
    #[serde(default)]
    pub trigger: DriftTrigger,
    #[serde(default)]
    pub fade: SmokeFade,
    /// Sideways friction stiffness while drifting.
    #[serde(default = "default_drift_stiffness")]
    pub drift_stiffness: f64,
    /// Sideways friction stiffness restored when the drift ends.
    #[serde(default = "default_nominal_stiffness")]
    pub nominal_stiffness: f64,
}

impl Default for DriftParams {
    fn default() -> Self {
        Self {
            trigger: DriftTrigger::default(),
            fade: SmokeFade::default(),
            drift_stiffness: default_drift_stiffness(),
            nominal_stiffness: default_nominal_stiffness(),
        }
    }
}

/// Wheel mesh animation. Absent when the car has no wheel meshes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WheelVisualParams {
    /// Degrees of wheel roll per metre travelled.
    pub spin_multiplier: f64,
}

/// Rear tyre smoke. Absent when the car has no smoke emitters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmokeParams {
    /// Particles per second at full intensity.
    pub max_emission_rate: f64,
    /// Intensity scale in `[0, 1]`.
    pub intensity: f64,
}

/// Engine sound pitch bias. Absent when the car has no engine audio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineParams {
    pub base_pitch: f64,
}

/// Per-wheel actuation for cars driven through wheel colliders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WheelParams {
    pub motor_torque: f64,
    pub brake_force: f64,
    #[serde(default = "default_reverse_torque_factor")]
    pub reverse_torque_factor: f64,
    #[serde(default = "default_coast_brake_factor")]
    pub coast_brake_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotionParams {
    pub max_forward_speed: f64,
    /// Also the maximum reverse speed.
    pub reverse_speed: f64,
    pub acceleration: f64,
    pub deceleration: f64,
    #[serde(default = "default_reverse_acceleration_factor")]
    pub reverse_acceleration_factor: f64,
    /// Turn rate at standstill, deg/s.
    pub turn_speed: f64,
    /// Turn rate at `max_forward_speed`, deg/s.
    pub turn_speed_at_max_speed: f64,
    /// Cosmetic front wheel steer angle at full input, deg.
    pub max_steering_angle: f64,
    #[serde(default)]
    pub throttle_response: ThrottleResponse,
    #[serde(default)]
    pub coast_curve: CoastCurve,
    #[serde(default)]
    pub drift: DriftParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheel_visuals: Option<WheelVisualParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoke: Option<SmokeParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheels: Option<WheelParams>,
}

fn default_reverse_acceleration_factor() -> f64 {
    0.7
}
fn default_drift_stiffness() -> f64 {
    0.5
}
fn default_nominal_stiffness() -> f64 {
    1.0
}
fn default_reverse_torque_factor() -> f64 {
    0.6
}
fn default_coast_brake_factor() -> f64 {
    0.2
}

impl Default for MotionParams {
    fn default() -> Self {
        Self::arcade()
    }
}

impl MotionParams {
    pub const PRESET_NAMES: [&'static str; 3] = ["arcade", "rc", "ar_wheel"];

    /// Joystick-driven arcade car: eased speed, smoke while steering hard at speed.
    pub fn arcade() -> Self {
        Self {
            max_forward_speed: 1.5,
            reverse_speed: 1.0,
            acceleration: 15.0,
            deceleration: 10.0,
            reverse_acceleration_factor: 0.7,
            turn_speed: 200.0,
            turn_speed_at_max_speed: 150.0,
            max_steering_angle: 25.0,
            throttle_response: ThrottleResponse::Proportional,
            coast_curve: CoastCurve::Exponential,
            drift: DriftParams {
                trigger: DriftTrigger::SteerAndSpeed {
                    min_steer_angle: 15.0,
                    min_speed: 0.8,
                },
                fade: SmokeFade::Instant,
                ..DriftParams::default()
            },
            wheel_visuals: Some(WheelVisualParams {
                spin_multiplier: 300.0,
            }),
            smoke: Some(SmokeParams {
                max_emission_rate: 25.0,
                intensity: 0.5,
            }),
            engine: None,
            wheels: None,
        }
    }

    /// RC car: full-speed targets, linear coasting, no visual collaborators.
    pub fn rc() -> Self {
        Self {
            max_forward_speed: 8.0,
            reverse_speed: 4.0,
            acceleration: 5.0,
            deceleration: 8.0,
            reverse_acceleration_factor: 1.0,
            turn_speed: 120.0,
            turn_speed_at_max_speed: 120.0,
            max_steering_angle: 25.0,
            throttle_response: ThrottleResponse::Full,
            coast_curve: CoastCurve::Linear,
            drift: DriftParams::default(),
            wheel_visuals: None,
            smoke: None,
            engine: None,
            wheels: None,
        }
    }

    /// Wheel-collider AR car: handbrake drift, torque commands, engine pitch.
    pub fn ar_wheel() -> Self {
        Self {
            max_forward_speed: 25.0 / 3.6,
            reverse_speed: 25.0 / 3.6 * 0.6,
            acceleration: 4.0,
            deceleration: 1.5,
            reverse_acceleration_factor: 0.6,
            turn_speed: 90.0,
            turn_speed_at_max_speed: 60.0,
            max_steering_angle: 25.0,
            throttle_response: ThrottleResponse::Proportional,
            coast_curve: CoastCurve::Exponential,
            drift: DriftParams {
                trigger: DriftTrigger::HandbrakeOrYawRate {
                    min_yaw_rate: 0.5_f64.to_degrees(),
                    min_speed: 5.0 / 3.6,
                },
                fade: SmokeFade::Instant,
                drift_stiffness: 0.5,
                nominal_stiffness: 1.0,
            },
            wheel_visuals: Some(WheelVisualParams {
                spin_multiplier: 360.0 / (2.0 * std::f64::consts::PI * 0.15),
            }),
            smoke: Some(SmokeParams {
                max_emission_rate: 25.0,
                intensity: 0.5,
            }),
            engine: Some(EngineParams { base_pitch: 1.0 }),
            wheels: Some(WheelParams {
                motor_torque: 200.0,
                brake_force: 150.0,
                reverse_torque_factor: 0.6,
                coast_brake_factor: 0.2,
            }),
        }
    }

    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "arcade" => Ok(Self::arcade()),
            "rc" => Ok(Self::rc()),
            "ar_wheel" => Ok(Self::ar_wheel()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// Checks every tuning value. Called once at load time, never per tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max_forward_speed", self.max_forward_speed)?;
        positive("reverse_speed", self.reverse_speed)?;
        positive("acceleration", self.acceleration)?;
        positive("deceleration", self.deceleration)?;
        positive("reverse_acceleration_factor", self.reverse_acceleration_factor)?;
        positive("turn_speed", self.turn_speed)?;
        positive("turn_speed_at_max_speed", self.turn_speed_at_max_speed)?;
        positive("max_steering_angle", self.max_steering_angle)?;

        match self.drift.trigger {
            DriftTrigger::Handbrake => {}
            DriftTrigger::SteerAndSpeed {
                min_steer_angle,
                min_speed,
            } => {
                positive("drift.trigger.min_steer_angle", min_steer_angle)?;
                positive("drift.trigger.min_speed", min_speed)?;
            }
            DriftTrigger::HandbrakeOrYawRate {
                min_yaw_rate,
                min_speed,
            } => {
                positive("drift.trigger.min_yaw_rate", min_yaw_rate)?;
                positive("drift.trigger.min_speed", min_speed)?;
            }
        }
        if let SmokeFade::FadeOut { duration } = self.drift.fade {
            positive("drift.fade.duration", duration)?;
        }
        positive("drift.drift_stiffness", self.drift.drift_stiffness)?;
        positive("drift.nominal_stiffness", self.drift.nominal_stiffness)?;

        if let Some(visuals) = &self.wheel_visuals {
            positive("wheel_visuals.spin_multiplier", visuals.spin_multiplier)?;
        }
        if let Some(smoke) = &self.smoke {
            positive("smoke.max_emission_rate", smoke.max_emission_rate)?;
            in_range("smoke.intensity", smoke.intensity, 0.0, 1.0)?;
        }
        if let Some(engine) = &self.engine {
            positive("engine.base_pitch", engine.base_pitch)?;
        }
        if let Some(wheels) = &self.wheels {
            positive("wheels.motor_torque", wheels.motor_torque)?;
            positive("wheels.brake_force", wheels.brake_force)?;
            positive("wheels.reverse_torque_factor", wheels.reverse_torque_factor)?;
            in_range("wheels.coast_brake_factor", wheels.coast_brake_factor, 0.0, 1.0)?;
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { name, value });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { name, value });
    }
    Ok(())
}

fn in_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { name, value });
    }
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for name in MotionParams::PRESET_NAMES {
            let params = MotionParams::from_preset(name).expect("known preset");
            assert_eq!(params.validate(), Ok(()), "preset {name}");
        }
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert_eq!(
            MotionParams::from_preset("hovercraft"),
            Err(ConfigError::UnknownPreset("hovercraft".into()))
        );
    }

    #[test]
    fn validate_rejects_non_positive_speed() {
        let params = MotionParams {
            max_forward_speed: 0.0,
            ..MotionParams::arcade()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::NonPositive {
                name: "max_forward_speed",
                value: 0.0
            })
        );
    }

    #[test]
    fn validate_rejects_bad_fade_and_intensity() {
        let mut params = MotionParams::arcade();
        params.drift.fade = SmokeFade::FadeOut { duration: -0.5 };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NonPositive {
                name: "drift.fade.duration",
                ..
            })
        ));

        let mut params = MotionParams::arcade();
        params.smoke = Some(SmokeParams {
            max_emission_rate: 25.0,
            intensity: 1.5,
        });
        assert!(matches!(
            params.validate(),
            Err(ConfigError::OutOfRange {
                name: "smoke.intensity",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_nan() {
        let params = MotionParams {
            turn_speed: f64::NAN,
            ..MotionParams::rc()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NotFinite {
                name: "turn_speed",
                ..
            })
        ));
    }
}
