// toycar_core/src/models/motion/visuals.rs

//! Cosmetic quantities derived from the motion state: wheel roll and steer,
//! tyre smoke emission and engine pitch.

use serde::{Deserialize, Serialize};

use super::drift::fade_fraction;
use super::params::{DriftTrigger, EngineParams, SmokeFade, SmokeParams, WheelVisualParams};
use super::state::DriftPhase;
use crate::utils::easing::{clamp01, wrap_degrees_positive};

/// Rotation to apply to the wheel meshes. Rear wheels only roll; front wheels also steer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelPose {
    pub spin_deg: f64,
    pub front_steer_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SmokeEmission {
    pub emitting: bool,
    /// Normalised intensity in `[0, 1]`, already scaled by any fade.
    pub intensity: f64,
    /// Particles per second.
    pub rate: f64,
}

/// Accumulates wheel roll for one tick, wrapped into `[0, 360)`.
pub fn advance_wheel_spin(
    current_deg: f64,
    forward_speed: f64,
    params: &WheelVisualParams,
    dt: f64,
) -> f64 {
    wrap_degrees_positive(current_deg + forward_speed * params.spin_multiplier * dt)
}

/// Smoke intensity while drifting, before any fade.
///
/// Intensity follows how hard the wheels are steered. Handbrake-driven drifts
/// emit at least the configured base intensity so a straight handbrake slide
/// still smokes.
pub fn drift_intensity(
    trigger: &DriftTrigger,
    steer_angle_deg: f64,
    max_steering_angle: f64,
    params: &SmokeParams,
) -> f64 {
    let steer_ratio = if max_steering_angle > 0.0 {
        steer_angle_deg.abs() / max_steering_angle
    } else {
        0.0
    };
    let intensity = clamp01(steer_ratio * params.intensity * 2.0);
    if matches!(trigger, DriftTrigger::SteerAndSpeed { .. }) {
        intensity
    } else {
        intensity.max(params.intensity)
    }
}

/// Smoke for the current drift phase.
///
/// A fade scales the intensity captured at release, not the current steer,
/// so a drift that ended because the wheels straightened still smokes.
pub fn smoke_emission(
    phase: DriftPhase,
    trigger: &DriftTrigger,
    fade: SmokeFade,
    steer_angle_deg: f64,
    max_steering_angle: f64,
    params: &SmokeParams,
) -> SmokeEmission {
    let intensity = match phase {
        DriftPhase::Normal => return SmokeEmission::default(),
        DriftPhase::Drifting => {
            drift_intensity(trigger, steer_angle_deg, max_steering_angle, params)
        }
        DriftPhase::FadingOut { intensity, .. } => intensity * fade_fraction(phase, fade),
    };

    SmokeEmission {
        emitting: true,
        intensity,
        rate: intensity * params.max_emission_rate,
    }
}

/// Engine pitch rises linearly with the speed ratio above the base pitch.
pub fn engine_pitch(params: &EngineParams, forward_speed: f64, max_forward_speed: f64) -> f64 {
    if max_forward_speed <= 0.0 {
        return params.base_pitch;
    }
    params.base_pitch + forward_speed.abs() / max_forward_speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SMOKE: SmokeParams = SmokeParams {
        max_emission_rate: 25.0,
        intensity: 0.5,
    };
    const STEER_TRIGGER: DriftTrigger = DriftTrigger::SteerAndSpeed {
        min_steer_angle: 15.0,
        min_speed: 0.8,
    };

    #[test]
    fn wheel_spin_accumulates_and_wraps() {
        let params = WheelVisualParams {
            spin_multiplier: 300.0,
        };
        let spin = advance_wheel_spin(350.0, 1.5, &params, 0.1);
        assert_abs_diff_eq!(spin, 35.0, epsilon = 1e-9);
        let backwards = advance_wheel_spin(10.0, -1.0, &params, 0.1);
        assert_abs_diff_eq!(backwards, 340.0, epsilon = 1e-9);
    }

    #[test]
    fn no_smoke_in_normal_phase() {
        let emission = smoke_emission(
            DriftPhase::Normal,
            &STEER_TRIGGER,
            SmokeFade::Instant,
            25.0,
            25.0,
            &SMOKE,
        );
        assert_eq!(emission, SmokeEmission::default());
    }

    #[test]
    fn smoke_rate_follows_steer_angle() {
        let emission = smoke_emission(
            DriftPhase::Drifting,
            &STEER_TRIGGER,
            SmokeFade::Instant,
            20.0,
            25.0,
            &SMOKE,
        );
        assert!(emission.emitting);
        // 20/25 * 0.5 * 2 = 0.8
        assert_abs_diff_eq!(emission.intensity, 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(emission.rate, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn handbrake_smoke_has_a_floor() {
        let emission = smoke_emission(
            DriftPhase::Drifting,
            &DriftTrigger::Handbrake,
            SmokeFade::Instant,
            0.0,
            25.0,
            &SMOKE,
        );
        assert_abs_diff_eq!(emission.intensity, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn fading_smoke_scales_the_release_intensity() {
        // The wheels are already straight; the fade keeps the released intensity.
        let emission = smoke_emission(
            DriftPhase::FadingOut {
                remaining: 0.25,
                intensity: 1.0,
            },
            &STEER_TRIGGER,
            SmokeFade::FadeOut { duration: 0.5 },
            0.0,
            25.0,
            &SMOKE,
        );
        assert!(emission.emitting);
        assert_abs_diff_eq!(emission.intensity, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(emission.rate, 12.5, epsilon = 1e-9);
    }

    #[test]
    fn engine_pitch_tracks_speed_ratio() {
        let params = EngineParams { base_pitch: 0.8 };
        assert_abs_diff_eq!(engine_pitch(&params, -3.0, 6.0), 1.3, epsilon = 1e-12);
        assert_abs_diff_eq!(engine_pitch(&params, 0.0, 6.0), 0.8, epsilon = 1e-12);
    }
}
