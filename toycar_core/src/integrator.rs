// toycar_core/src/integrator.rs

use dyn_clone::DynClone;
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::models::motion::MotionOutput;
use crate::types::Pose;

/// Surface normals shorter than this are treated as degenerate.
const MIN_NORMAL_NORM: f64 = 1e-9;

/// Standard gravity, m/s^2.
pub const DEFAULT_GRAVITY: f64 = 9.81;

/// Result of the most recent ground probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "PascalCase")]
pub enum GroundContact {
    /// On the ground. `normal` is unit length.
    Grounded { normal: Vector3<f64> },
    Airborne,
}

impl GroundContact {
    /// Grounded on a level surface.
    pub fn flat() -> Self {
        GroundContact::Grounded {
            normal: Vector3::y(),
        }
    }

    /// Normalises `normal`, falling back to world up for degenerate vectors.
    pub fn from_normal(normal: Vector3<f64>) -> Self {
        let norm = normal.norm();
        if norm.is_finite() && norm > MIN_NORMAL_NORM {
            GroundContact::Grounded {
                normal: normal / norm,
            }
        } else {
            GroundContact::flat()
        }
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self, GroundContact::Grounded { .. })
    }
}

// --- PHYSICS INTEGRATOR TRAIT ---
// Turns one tick of motion output into a new body pose.
pub trait PhysicsIntegrator: DynClone + Debug + Send + Sync {
    /// Applies the tick's velocity and heading, returning the new pose.
    fn integrate(&mut self, output: &MotionOutput, dt: f64) -> Pose;

    fn pose(&self) -> Pose;

    /// Snaps the body onto a surface at `height` after a fall.
    fn land(&mut self, height: f64);
}

dyn_clone::clone_trait_object!(PhysicsIntegrator);

/// Kinematic body: velocity is set directly from the motion output.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicIntegrator {
    pose: Pose,
    vertical_velocity: f64,
    gravity: f64,
    gravity_multiplier: f64,
}

impl KinematicIntegrator {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            vertical_velocity: 0.0,
            gravity: DEFAULT_GRAVITY,
            gravity_multiplier: 1.0,
        }
    }

    pub fn with_gravity(mut self, gravity: f64, multiplier: f64) -> Self {
        self.gravity = gravity;
        self.gravity_multiplier = multiplier;
        self
    }

    pub fn vertical_velocity(&self) -> f64 {
        self.vertical_velocity
    }
}

impl Default for KinematicIntegrator {
    fn default() -> Self {
        Self::new(Pose::identity())
    }
}

/// Body rotation for a heading in degrees. Forward is +Z, up is +Y.
pub fn heading_rotation(heading_deg: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), heading_deg.to_radians())
}

impl PhysicsIntegrator for KinematicIntegrator {
    fn integrate(&mut self, output: &MotionOutput, dt: f64) -> Pose {
        if !output.applied || !(dt > 0.0) || !dt.is_finite() {
            return self.pose;
        }

        let rotation = heading_rotation(output.heading_deg);
        let forward = rotation * Vector3::z();

        let velocity = match output.ground {
            GroundContact::Grounded { normal } => {
                self.vertical_velocity = 0.0;
                let along = forward - normal * forward.dot(&normal);
                let along_norm = along.norm();
                if along_norm > MIN_NORMAL_NORM {
                    along * (output.forward_speed / along_norm)
                } else {
                    Vector3::zeros()
                }
            }
            GroundContact::Airborne => {
                self.vertical_velocity -= self.gravity * self.gravity_multiplier * dt;
                forward * output.forward_speed + Vector3::y() * self.vertical_velocity
            }
        };

        let translation = self.pose.translation.vector + velocity * dt;
        self.pose = Isometry3::from_parts(Translation3::from(translation), rotation);
        self.pose
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn land(&mut self, height: f64) {
        self.pose.translation.vector.y = height;
        self.vertical_velocity = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::motion::{MotionParams, VehicleMotionModel};
    use crate::types::DriveInput;
    use approx::assert_abs_diff_eq;

    fn output(speed: f64, heading_deg: f64, ground: GroundContact) -> MotionOutput {
        let mut model = VehicleMotionModel::new(MotionParams::rc());
        model.on_ground_contact(match ground {
            GroundContact::Grounded { normal } => Some(normal),
            GroundContact::Airborne => None,
        });
        let mut out = model.advance(0.0, DriveInput::NEUTRAL);
        out.forward_speed = speed;
        out.heading_deg = heading_deg;
        out
    }

    #[test]
    fn moves_along_heading_on_flat_ground() {
        let mut integrator = KinematicIntegrator::default();
        let pose = integrator.integrate(&output(2.0, 90.0, GroundContact::flat()), 0.5);
        assert_abs_diff_eq!(pose.translation.vector, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);

        let forward = pose.rotation * Vector3::z();
        assert_abs_diff_eq!(forward, Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn follows_a_slope_at_constant_speed() {
        let normal = Vector3::new(0.0, 1.0, -1.0);
        let mut integrator = KinematicIntegrator::default();
        let pose = integrator.integrate(&output(1.0, 0.0, GroundContact::from_normal(normal)), 1.0);
        let moved = pose.translation.vector;
        assert_abs_diff_eq!(moved.norm(), 1.0, epsilon = 1e-12);
        assert!(moved.y > 0.0 && moved.z > 0.0);
    }

    #[test]
    fn falls_while_airborne() {
        let mut integrator =
            KinematicIntegrator::new(Pose::translation(0.0, 1.0, 0.0)).with_gravity(10.0, 2.0);
        let pose = integrator.integrate(&output(0.0, 0.0, GroundContact::Airborne), 0.1);
        assert_abs_diff_eq!(integrator.vertical_velocity(), -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.translation.vector.y, 0.8, epsilon = 1e-12);

        integrator.land(0.0);
        assert_eq!(integrator.pose().translation.vector.y, 0.0);
        assert_eq!(integrator.vertical_velocity(), 0.0);
    }

    #[test]
    fn unapplied_ticks_do_not_move() {
        let mut integrator = KinematicIntegrator::default();
        let mut out = output(2.0, 0.0, GroundContact::flat());
        out.applied = false;
        assert_eq!(integrator.integrate(&out, 0.1), Pose::identity());
    }

    #[test]
    fn degenerate_normals_fall_back_to_up() {
        assert_eq!(GroundContact::from_normal(Vector3::zeros()), GroundContact::flat());
        assert_eq!(
            GroundContact::from_normal(Vector3::new(f64::NAN, 1.0, 0.0)),
            GroundContact::flat()
        );
    }
}
