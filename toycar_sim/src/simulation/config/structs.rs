// toycar_sim/src/simulation/config/structs.rs

use bevy::prelude::{Resource, Transform};
use figment::value::Value;
use nalgebra::{Isometry3, Translation3, Vector3};
use serde::Deserialize;
use std::path::PathBuf;
use toycar_core::error::ConfigError;
use toycar_core::input::{JoystickAxes, ScriptStep, TimedState, TouchButtons};
use toycar_core::integrator::{heading_rotation, DEFAULT_GRAVITY};
use toycar_core::models::motion::MotionParams;
use toycar_core::placement::TrackingStatus;
use toycar_core::types::Pose;

use crate::simulation::core::transforms::pose_to_transform;

// =========================================================================
// == Top-Level Configuration Resource ==
// =========================================================================

/// The root of a scenario TOML file.
///
/// Vehicles stay as raw values until they are resolved against the prefab catalog.
#[derive(Resource, Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)] // Use defaults if the [simulation] section is missing
    pub simulation: SimulationSettings,

    // `[[vehicles]]` entries, each optionally `from = "cars.<prefab>"`.
    #[serde(default)]
    pub vehicles: Vec<Value>,

    #[serde(default)]
    pub skin_changes: Vec<SkinChange>,
}

/// Where the run reads its catalog from and writes its outputs to.
#[derive(Resource, Debug, Clone, Default)]
pub struct RunOptions {
    pub catalog_dir: PathBuf,
    pub skin_prefs: Option<PathBuf>,
    pub telemetry_csv: Option<PathBuf>,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SimulationSettings {
    /// Simulated time after which the run stops, in seconds.
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: f64,
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: f64,
    #[serde(default = "default_telemetry_interval_seconds")]
    pub telemetry_interval_seconds: f64,
}

fn default_duration_seconds() -> f64 {
    10.0
}
fn default_tick_rate_hz() -> f64 {
    50.0
}
fn default_telemetry_interval_seconds() -> f64 {
    1.0
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            duration_seconds: default_duration_seconds(),
            tick_rate_hz: default_tick_rate_hz(),
            telemetry_interval_seconds: default_telemetry_interval_seconds(),
        }
    }
}

impl SimulationSettings {
    pub fn fixed_dt(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("simulation.duration_seconds", self.duration_seconds),
            ("simulation.tick_rate_hz", self.tick_rate_hz),
            (
                "simulation.telemetry_interval_seconds",
                self.telemetry_interval_seconds,
            ),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}

/// A fully resolved `[[vehicles]]` entry.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct VehicleConfig {
    pub name: String,
    #[serde(default)]
    pub start_pose: StartPose,
    #[serde(default)]
    pub motion: MotionParams,
    #[serde(default)]
    pub script: Vec<ScriptStep>,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub ground: GroundConfig,
    #[serde(default)]
    pub skin: Option<SkinConfig>,
}

/// The device that drives a car. `Script` replays the vehicle's `script`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(tag = "type", rename_all = "PascalCase")]
pub enum InputConfig {
    #[default]
    Script,
    Joystick {
        moves: Vec<TimedState<JoystickAxes>>,
    },
    Buttons {
        presses: Vec<TimedState<TouchButtons>>,
    },
    /// Keyboard axes win whenever any key is held.
    KeyboardOverJoystick {
        #[serde(default)]
        keyboard: Vec<TimedState<JoystickAxes>>,
        #[serde(default)]
        joystick: Vec<TimedState<JoystickAxes>>,
    },
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StartPose {
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub heading_deg: f64,
}

impl StartPose {
    pub fn to_isometry(&self) -> Pose {
        Isometry3::from_parts(
            Translation3::from(Vector3::from(self.position)),
            heading_rotation(self.heading_deg),
        )
    }

    pub fn to_bevy_transform(&self) -> Transform {
        pose_to_transform(&self.to_isometry())
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PlacementConfig {
    /// Whether the car is already placed when the run starts.
    #[serde(default = "default_placed_at_start")]
    pub placed_at_start: bool,
    /// Scripted tracking changes, replayed against simulated time.
    #[serde(default)]
    pub events: Vec<TrackingStep>,
}

fn default_placed_at_start() -> bool {
    true
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            placed_at_start: default_placed_at_start(),
            events: Vec::new(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TrackingStep {
    pub at: f64,
    pub status: TrackingStatus,
}

/// A flat ground plane under the car.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GroundConfig {
    #[serde(default)]
    pub height: f64,
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    /// Extra gravity applied while airborne.
    #[serde(default = "default_gravity_multiplier")]
    pub gravity_multiplier: f64,
}

fn default_gravity() -> f64 {
    DEFAULT_GRAVITY
}
fn default_gravity_multiplier() -> f64 {
    1.0
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            height: 0.0,
            gravity: default_gravity(),
            gravity_multiplier: default_gravity_multiplier(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SkinConfig {
    /// Names of the available body materials.
    pub skins: Vec<String>,
    #[serde(default = "default_body_material_name")]
    pub body_material_name: String,
    /// Material names on the body renderer before any skin is applied.
    #[serde(default = "default_material_slots")]
    pub material_slots: Vec<String>,
}

fn default_body_material_name() -> String {
    "CarBody".to_string()
}
fn default_material_slots() -> Vec<String> {
    vec![default_body_material_name()]
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum SkinDirection {
    Next,
    Previous,
}

/// A scripted press of the skin selector's next/previous button.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SkinChange {
    pub at: f64,
    pub direction: SkinDirection,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use figment::{
        providers::{Format, Toml},
        Figment,
    };

    #[test]
    fn scenario_defaults_fill_missing_sections() {
        let config: ScenarioConfig = Figment::new()
            .merge(Toml::string("[[vehicles]]\nname = \"solo\"\n"))
            .extract()
            .expect("valid scenario");
        assert_eq!(config.simulation, SimulationSettings::default());
        assert_eq!(config.vehicles.len(), 1);
        assert_abs_diff_eq!(config.simulation.fixed_dt(), 0.02);
    }

    #[test]
    fn unknown_scenario_keys_are_rejected() {
        let result: Result<ScenarioConfig, _> = Figment::new()
            .merge(Toml::string("[simulation]\nduraton_seconds = 3.0\n"))
            .extract();
        assert!(result.is_err());
    }

    #[test]
    fn settings_validation() {
        let settings = SimulationSettings {
            tick_rate_hz: 0.0,
            ..SimulationSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::NonPositive {
                name: "simulation.tick_rate_hz",
                ..
            })
        ));
        assert!(SimulationSettings::default().validate().is_ok());
    }

    #[test]
    fn vehicle_input_defaults_to_its_script() {
        let vehicle: VehicleConfig = Figment::new()
            .merge(Toml::string("name = \"solo\"\n"))
            .extract()
            .expect("valid vehicle");
        assert_eq!(vehicle.input, InputConfig::Script);
    }

    #[test]
    fn button_presses_parse_with_partial_states() {
        let vehicle: VehicleConfig = Figment::new()
            .merge(Toml::string(
                r#"
                name = "buttons"
                input = { type = "Buttons", presses = [
                    { at = 0, throttle = true },
                    { at = 1.5, throttle = true, left = true },
                ] }
                "#,
            ))
            .extract()
            .expect("valid vehicle");
        let InputConfig::Buttons { presses } = vehicle.input else {
            panic!("expected button input, got {:?}", vehicle.input);
        };
        assert_eq!(presses.len(), 2);
        assert_abs_diff_eq!(presses[1].at, 1.5);
        assert!(presses[1].state.left);
        assert!(!presses[1].state.handbrake);
    }

    #[test]
    fn start_pose_faces_its_heading() {
        let pose = StartPose {
            position: [1.0, 0.0, 2.0],
            heading_deg: 90.0,
        };
        let transform = pose.to_bevy_transform();
        assert_abs_diff_eq!(transform.translation.x, 1.0);
        let forward = transform.rotation * bevy::math::Vec3::Z;
        assert_abs_diff_eq!(forward.x, 1.0, epsilon = 1e-6);
    }
}
