// toycar_core/src/models/motion/model.rs

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::drift::{self, DriftEdge, DriftSample, FrictionState};
use super::params::{CoastCurve, MotionParams, ThrottleResponse};
use super::state::{DriftPhase, VehicleState};
use super::visuals::{self, SmokeEmission, WheelPose};
use super::wheels::{self, WheelCommands};
use crate::integrator::GroundContact;
use crate::placement::{PlacementGate, TrackingStatus};
use crate::types::{DriveInput, STEER_SPEED_EPSILON, THROTTLE_DEADZONE};
use crate::utils::easing::{clamp01, lerp, move_towards, wrap_degrees};

/// Everything the integrator and the effect sinks need from one tick.
///
/// The optional fields are `None` when the matching section is absent from
/// `MotionParams`, or when the tick was not applied because the car is not placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionOutput {
    /// False when the placement gate was closed and the state was left untouched.
    pub applied: bool,
    pub forward_speed: f64,
    pub heading_deg: f64,
    pub heading_delta_deg: f64,
    pub steer_angle_deg: f64,
    pub is_reversing: bool,
    pub drift: DriftPhase,
    pub drift_edge: Option<DriftEdge>,
    pub friction: FrictionState,
    pub ground: GroundContact,
    pub wheel_pose: Option<WheelPose>,
    pub smoke: Option<SmokeEmission>,
    pub engine_pitch: Option<f64>,
    pub wheels: Option<WheelCommands>,
}

/// One parameterised motion model covering every car variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleMotionModel {
    params: MotionParams,
    state: VehicleState,
    placement: PlacementGate,
    ground: GroundContact,
}

impl VehicleMotionModel {
    /// Creates a model that is already placed and grounded on a flat surface.
    pub fn new(params: MotionParams) -> Self {
        Self {
            params,
            state: VehicleState::default(),
            placement: PlacementGate::new(true),
            ground: GroundContact::flat(),
        }
    }

    /// Creates a model that waits for a placement or tracking event before moving.
    pub fn awaiting_placement(params: MotionParams) -> Self {
        Self {
            placement: PlacementGate::new(false),
            ..Self::new(params)
        }
    }

    pub fn with_heading(mut self, heading_deg: f64) -> Self {
        self.state.heading_deg = wrap_degrees(heading_deg);
        self
    }

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn is_placed(&self) -> bool {
        self.placement.is_placed()
    }

    pub fn ground(&self) -> GroundContact {
        self.ground
    }

    // --- Event inputs ---

    pub fn on_placement_changed(&mut self, placed: bool) -> bool {
        self.placement.on_placement_changed(placed)
    }

    pub fn on_tracking_status(&mut self, status: TrackingStatus) -> bool {
        self.placement.on_tracking_status(status)
    }

    /// `Some(normal)` when a ground probe hits, `None` when airborne.
    pub fn on_ground_contact(&mut self, normal: Option<Vector3<f64>>) {
        self.ground = match normal {
            Some(n) => GroundContact::from_normal(n),
            None => GroundContact::Airborne,
        };
    }

    /// Stops the car in place, keeping its heading.
    pub fn reset(&mut self) {
        self.state = VehicleState::with_heading(self.state.heading_deg);
    }

    // --- Per-tick update ---

    /// Advances the model by one fixed tick.
    pub fn advance(&mut self, dt: f64, input: DriveInput) -> MotionOutput {
        if !self.placement.is_placed() {
            return self.idle_output();
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let input = input.clamped();

        self.update_speed(dt, input.throttle);
        let heading_delta = self.update_steering(dt, input.steer);

        let sample = DriftSample {
            forward_speed: self.state.forward_speed,
            steer_angle_deg: self.state.steer_angle_deg,
            yaw_rate_deg: self.state.yaw_rate_deg,
            handbrake: input.handbrake,
        };
        let drift_params = self.params.drift;
        let triggered = drift::is_triggered(&drift_params.trigger, &sample);
        let (phase, drift_edge) = drift::step_phase(
            self.state.drift,
            triggered,
            drift_params.fade,
            self.state.smoke_intensity,
            dt,
        );
        self.state.drift = phase;
        self.state.sliding = drift::is_sliding(&drift_params.trigger, &sample);
        let friction = drift::friction_for(self.state.sliding, &drift_params);

        let wheel_pose = self.params.wheel_visuals.map(|wheel_visuals| {
            self.state.wheel_spin_deg = visuals::advance_wheel_spin(
                self.state.wheel_spin_deg,
                self.state.forward_speed,
                &wheel_visuals,
                dt,
            );
            WheelPose {
                spin_deg: self.state.wheel_spin_deg,
                front_steer_deg: self.state.steer_angle_deg,
            }
        });
        let smoke = self.params.smoke.map(|smoke| {
            let emission = visuals::smoke_emission(
                phase,
                &drift_params.trigger,
                drift_params.fade,
                self.state.steer_angle_deg,
                self.params.max_steering_angle,
                &smoke,
            );
            if phase.is_drifting() {
                self.state.smoke_intensity = emission.intensity;
            }
            emission
        });
        let engine_pitch = self.params.engine.map(|engine| {
            visuals::engine_pitch(
                &engine,
                self.state.forward_speed,
                self.params.max_forward_speed,
            )
        });
        let wheels = self.params.wheels.map(|wheel_params| {
            wheels::wheel_commands(
                &input,
                &friction,
                &wheel_params,
                self.params.max_steering_angle,
            )
        });

        MotionOutput {
            applied: true,
            forward_speed: self.state.forward_speed,
            heading_deg: self.state.heading_deg,
            heading_delta_deg: heading_delta,
            steer_angle_deg: self.state.steer_angle_deg,
            is_reversing: self.state.is_reversing,
            drift: phase,
            drift_edge,
            friction,
            ground: self.ground,
            wheel_pose,
            smoke,
            engine_pitch,
            wheels,
        }
    }

    fn update_speed(&mut self, dt: f64, throttle: f64) {
        let params = &self.params;
        let state = &mut self.state;
        let throttle_scale = match params.throttle_response {
            ThrottleResponse::Proportional => throttle,
            ThrottleResponse::Full => throttle.signum(),
        };

        if throttle > THROTTLE_DEADZONE {
            state.is_reversing = false;
            let target = params.max_forward_speed * throttle_scale;
            state.forward_speed = lerp(state.forward_speed, target, params.acceleration * dt);
        } else if throttle < -THROTTLE_DEADZONE {
            state.is_reversing = true;
            let target = params.reverse_speed * throttle_scale;
            let rate = params.acceleration * params.reverse_acceleration_factor;
            state.forward_speed = lerp(state.forward_speed, target, rate * dt);
        } else {
            state.is_reversing = false;
            state.forward_speed = match params.coast_curve {
                CoastCurve::Exponential => lerp(state.forward_speed, 0.0, params.deceleration * dt),
                CoastCurve::Linear => move_towards(state.forward_speed, 0.0, params.deceleration * dt),
            };
        }

        state.forward_speed = state
            .forward_speed
            .clamp(-params.reverse_speed, params.max_forward_speed);
    }

    /// Returns the heading change applied this tick, in degrees.
    fn update_steering(&mut self, dt: f64, steer: f64) -> f64 {
        let params = &self.params;
        let state = &mut self.state;
        let speed = state.forward_speed.abs();

        let heading_delta = if speed > STEER_SPEED_EPSILON {
            let speed_ratio = clamp01(speed / params.max_forward_speed);
            let turn_rate = lerp(params.turn_speed, params.turn_speed_at_max_speed, speed_ratio);
            let direction = if state.is_reversing { -1.0 } else { 1.0 };
            let delta = steer * turn_rate * dt * direction;
            state.heading_deg = wrap_degrees(state.heading_deg + delta);
            state.steer_angle_deg = steer * params.max_steering_angle;
            delta
        } else {
            state.steer_angle_deg = 0.0;
            0.0
        };

        state.yaw_rate_deg = if dt > 0.0 { heading_delta / dt } else { 0.0 };
        heading_delta
    }

    fn idle_output(&self) -> MotionOutput {
        MotionOutput {
            applied: false,
            forward_speed: self.state.forward_speed,
            heading_deg: self.state.heading_deg,
            heading_delta_deg: 0.0,
            steer_angle_deg: self.state.steer_angle_deg,
            is_reversing: self.state.is_reversing,
            drift: self.state.drift,
            drift_edge: None,
            friction: drift::friction_for(self.state.sliding, &self.params.drift),
            ground: self.ground,
            wheel_pose: None,
            smoke: None,
            engine_pitch: None,
            wheels: None,
        }
    }
}
