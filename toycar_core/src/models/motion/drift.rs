// toycar_core/src/models/motion/drift.rs

//! The two-state drift machine (three with a timed smoke fade) and the friction
//! values of a sliding car.
//!
//! The trigger decides when the tyre effects run. Grip loss follows the same
//! trigger, except for `HandbrakeOrYawRate` where only the handbrake slides the car.

use serde::{Deserialize, Serialize};

use super::params::{DriftParams, DriftTrigger, SmokeFade};
use super::state::DriftPhase;

/// Remaining fade time at or below which the fade counts as expired.
const FADE_EPSILON: f64 = 1e-9;

/// The per-tick quantities a drift trigger may look at.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriftSample {
    pub forward_speed: f64,
    pub steer_angle_deg: f64,
    pub yaw_rate_deg: f64,
    pub handbrake: bool,
}

/// Tyre friction that the integrator or wheel colliders should use this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrictionState {
    pub sideways_stiffness: f64,
    /// Whether the longitudinal brake is fully applied (drift handbrake).
    pub full_brake: bool,
}

/// An edge of the drift machine, reported for logging and effect sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriftEdge {
    /// `Normal` or `FadingOut` to `Drifting`.
    Entered,
    /// `Drifting` to `Normal` or `FadingOut`.
    Released,
    /// `FadingOut` to `Normal`: the smoke has stopped.
    FadeExpired,
}

/// Whether the drift effects should run this tick.
pub fn is_triggered(trigger: &DriftTrigger, sample: &DriftSample) -> bool {
    let speed = sample.forward_speed.abs();
    match *trigger {
        DriftTrigger::Handbrake => sample.handbrake,
        DriftTrigger::SteerAndSpeed {
            min_steer_angle,
            min_speed,
        } => sample.steer_angle_deg.abs() > min_steer_angle && speed > min_speed,
        DriftTrigger::HandbrakeOrYawRate {
            min_yaw_rate,
            min_speed,
        } => sample.handbrake || (sample.yaw_rate_deg.abs() > min_yaw_rate && speed > min_speed),
    }
}

/// Whether the tyres lose grip this tick.
pub fn is_sliding(trigger: &DriftTrigger, sample: &DriftSample) -> bool {
    match trigger {
        DriftTrigger::HandbrakeOrYawRate { .. } => sample.handbrake,
        DriftTrigger::Handbrake | DriftTrigger::SteerAndSpeed { .. } => is_triggered(trigger, sample),
    }
}

/// Advances the drift phase by one tick.
///
/// Transitions happen on the tick the trigger changes. A fade timer is only
/// decremented on ticks after the release tick, so emission lasts exactly
/// `duration` seconds of simulated time. `release_intensity` is the smoke
/// intensity of the last drifting tick; a fade starts from it.
pub fn step_phase(
    phase: DriftPhase,
    triggered: bool,
    fade: SmokeFade,
    release_intensity: f64,
    dt: f64,
) -> (DriftPhase, Option<DriftEdge>) {
    if triggered {
        return match phase {
            DriftPhase::Drifting => (DriftPhase::Drifting, None),
            DriftPhase::Normal | DriftPhase::FadingOut { .. } => {
                (DriftPhase::Drifting, Some(DriftEdge::Entered))
            }
        };
    }

    match phase {
        DriftPhase::Normal => (DriftPhase::Normal, None),
        DriftPhase::Drifting => match fade {
            SmokeFade::Instant => (DriftPhase::Normal, Some(DriftEdge::Released)),
            SmokeFade::FadeOut { duration } => (
                DriftPhase::FadingOut {
                    remaining: duration,
                    intensity: release_intensity,
                },
                Some(DriftEdge::Released),
            ),
        },
        DriftPhase::FadingOut {
            remaining,
            intensity,
        } => {
            let remaining = remaining - dt;
            if remaining <= FADE_EPSILON {
                (DriftPhase::Normal, Some(DriftEdge::FadeExpired))
            } else {
                (
                    DriftPhase::FadingOut {
                        remaining,
                        intensity,
                    },
                    None,
                )
            }
        }
    }
}

pub fn friction_for(sliding: bool, params: &DriftParams) -> FrictionState {
    if sliding {
        FrictionState {
            sideways_stiffness: params.drift_stiffness,
            full_brake: true,
        }
    } else {
        FrictionState {
            sideways_stiffness: params.nominal_stiffness,
            full_brake: false,
        }
    }
}

/// Remaining fraction of the fade in `[0, 1]`; 1 outside of a fade.
pub fn fade_fraction(phase: DriftPhase, fade: SmokeFade) -> f64 {
    match (phase, fade) {
        (DriftPhase::FadingOut { remaining, .. }, SmokeFade::FadeOut { duration })
            if duration > 0.0 =>
        {
            (remaining / duration).clamp(0.0, 1.0)
        }
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const FADE: SmokeFade = SmokeFade::FadeOut { duration: 0.5 };

    #[test]
    fn handbrake_trigger_follows_button() {
        let sample = DriftSample {
            handbrake: true,
            ..DriftSample::default()
        };
        assert!(is_triggered(&DriftTrigger::Handbrake, &sample));
        assert!(!is_triggered(&DriftTrigger::Handbrake, &DriftSample::default()));
    }

    #[test]
    fn steer_and_speed_needs_both() {
        let trigger = DriftTrigger::SteerAndSpeed {
            min_steer_angle: 15.0,
            min_speed: 0.8,
        };
        let mut sample = DriftSample {
            forward_speed: -1.0,
            steer_angle_deg: 20.0,
            ..DriftSample::default()
        };
        assert!(is_triggered(&trigger, &sample));
        sample.steer_angle_deg = 10.0;
        assert!(!is_triggered(&trigger, &sample));
        sample.steer_angle_deg = -20.0;
        sample.forward_speed = 0.5;
        assert!(!is_triggered(&trigger, &sample));
        // The handbrake is irrelevant for this policy.
        sample.handbrake = true;
        assert!(!is_triggered(&trigger, &sample));
    }

    #[test]
    fn yaw_rate_trigger_accepts_either_condition() {
        let trigger = DriftTrigger::HandbrakeOrYawRate {
            min_yaw_rate: 30.0,
            min_speed: 1.0,
        };
        let fast_turn = DriftSample {
            forward_speed: 2.0,
            yaw_rate_deg: -45.0,
            ..DriftSample::default()
        };
        assert!(is_triggered(&trigger, &fast_turn));
        let slow_turn = DriftSample {
            forward_speed: 0.5,
            ..fast_turn
        };
        assert!(!is_triggered(&trigger, &slow_turn));
        let braked = DriftSample {
            handbrake: true,
            ..slow_turn
        };
        assert!(is_triggered(&trigger, &braked));
    }

    #[test]
    fn instant_policy_returns_to_normal() {
        let (phase, edge) = step_phase(DriftPhase::Normal, true, SmokeFade::Instant, 0.0, 0.02);
        assert_eq!((phase, edge), (DriftPhase::Drifting, Some(DriftEdge::Entered)));
        let (phase, edge) = step_phase(phase, true, SmokeFade::Instant, 0.0, 0.02);
        assert_eq!((phase, edge), (DriftPhase::Drifting, None));
        let (phase, edge) = step_phase(phase, false, SmokeFade::Instant, 0.0, 0.02);
        assert_eq!((phase, edge), (DriftPhase::Normal, Some(DriftEdge::Released)));
    }

    #[test]
    fn fade_policy_counts_down_then_expires() {
        let (mut phase, edge) = step_phase(DriftPhase::Drifting, false, FADE, 0.8, 0.1);
        assert_eq!(edge, Some(DriftEdge::Released));
        assert_eq!(
            phase,
            DriftPhase::FadingOut {
                remaining: 0.5,
                intensity: 0.8
            }
        );

        let mut ticks_until_expiry = 0;
        loop {
            let (next, edge) = step_phase(phase, false, FADE, 0.0, 0.1);
            ticks_until_expiry += 1;
            phase = next;
            if edge == Some(DriftEdge::FadeExpired) {
                break;
            }
            assert!(phase.is_emitting());
        }
        assert_eq!(ticks_until_expiry, 5);
        assert_eq!(phase, DriftPhase::Normal);
    }

    #[test]
    fn retrigger_during_fade_resumes_drift() {
        let phase = DriftPhase::FadingOut {
            remaining: 0.2,
            intensity: 0.4,
        };
        let (phase, edge) = step_phase(phase, true, FADE, 0.4, 0.02);
        assert_eq!((phase, edge), (DriftPhase::Drifting, Some(DriftEdge::Entered)));
        // The next release restarts the full fade from the new intensity.
        let (phase, _) = step_phase(phase, false, FADE, 0.9, 0.02);
        assert_eq!(
            phase,
            DriftPhase::FadingOut {
                remaining: 0.5,
                intensity: 0.9
            }
        );
    }

    #[test]
    fn friction_switches_with_sliding() {
        let params = DriftParams::default();
        let sliding = friction_for(true, &params);
        assert_abs_diff_eq!(sliding.sideways_stiffness, 0.5);
        assert!(sliding.full_brake);

        let gripping = friction_for(false, &params);
        assert_abs_diff_eq!(gripping.sideways_stiffness, 1.0);
        assert!(!gripping.full_brake);
    }

    #[test]
    fn yaw_rate_turns_only_slide_with_the_handbrake() {
        let trigger = DriftTrigger::HandbrakeOrYawRate {
            min_yaw_rate: 30.0,
            min_speed: 1.0,
        };
        let fast_turn = DriftSample {
            forward_speed: 5.0,
            yaw_rate_deg: 60.0,
            ..DriftSample::default()
        };
        assert!(is_triggered(&trigger, &fast_turn));
        assert!(!is_sliding(&trigger, &fast_turn));

        let braked = DriftSample {
            handbrake: true,
            ..fast_turn
        };
        assert!(is_sliding(&trigger, &braked));

        let steer_trigger = DriftTrigger::SteerAndSpeed {
            min_steer_angle: 15.0,
            min_speed: 0.8,
        };
        let steered = DriftSample {
            forward_speed: 1.0,
            steer_angle_deg: 20.0,
            ..DriftSample::default()
        };
        assert!(is_sliding(&steer_trigger, &steered));
    }

    #[test]
    fn fade_fraction_scales_with_remaining_time() {
        assert_abs_diff_eq!(
            fade_fraction(
                DriftPhase::FadingOut {
                    remaining: 0.25,
                    intensity: 1.0
                },
                FADE
            ),
            0.5
        );
        assert_abs_diff_eq!(fade_fraction(DriftPhase::Drifting, FADE), 1.0);
    }
}
