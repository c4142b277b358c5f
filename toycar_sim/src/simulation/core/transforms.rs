// toycar_sim/src/simulation/core/transforms.rs

//! Conversions between core poses and Bevy transforms.
//!
//! Both sides use Y-up with +Z as the car's forward axis, so only the
//! precision changes.

use bevy::prelude::{Quat, Transform, Vec3};
use toycar_core::types::Pose;

pub fn pose_to_transform(pose: &Pose) -> Transform {
    let t = pose.translation.vector;
    let q = pose.rotation;
    Transform {
        translation: Vec3::new(t.x as f32, t.y as f32, t.z as f32),
        rotation: Quat::from_xyzw(q.i as f32, q.j as f32, q.k as f32, q.w as f32),
        ..Transform::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use toycar_core::integrator::heading_rotation;

    #[test]
    fn heading_matches_bevy_yaw() {
        let pose = Pose::from_parts(
            nalgebra::Translation3::new(1.0, 2.0, 3.0),
            heading_rotation(-45.0),
        );
        let transform = pose_to_transform(&pose);
        let expected = Quat::from_rotation_y((-45.0f32).to_radians());
        assert!(transform.rotation.abs_diff_eq(expected, 1e-6));
        assert_abs_diff_eq!(transform.translation.z, 3.0);
    }
}
