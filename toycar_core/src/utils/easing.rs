// toycar_core/src/utils/easing.rs

//! Scalar interpolation helpers shared by the motion model.
//!
//! All helpers are generic over `num_traits::Float` so they work for both the
//! `f64` core and any `f32` adapter code.

use num_traits::Float;

/// Clamps `t` into `[0, 1]`. NaN maps to 0.
pub fn clamp01<T: Float>(t: T) -> T {
    if t.is_nan() {
        return T::zero();
    }
    t.max(T::zero()).min(T::one())
}

/// Interpolates from `current` toward `target` by the fraction `t`, clamped to `[0, 1]`.
///
/// Called once per tick with `t = rate * dt` this is exponential-decay easing:
/// the value approaches the target asymptotically and never overshoots it.
pub fn lerp<T: Float>(current: T, target: T, t: T) -> T {
    current + (target - current) * clamp01(t)
}

/// Moves `current` toward `target` by at most `max_delta`, landing exactly on it.
pub fn move_towards<T: Float>(current: T, target: T, max_delta: T) -> T {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Wraps an angle in degrees into `(-180, 180]`.
pub fn wrap_degrees<T: Float>(angle: T) -> T {
    let full = T::from(360.0).unwrap_or_else(T::zero);
    let half = T::from(180.0).unwrap_or_else(T::zero);
    let mut wrapped = angle % full;
    if wrapped <= -half {
        wrapped = wrapped + full;
    } else if wrapped > half {
        wrapped = wrapped - full;
    }
    wrapped
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn wrap_degrees_positive<T: Float>(angle: T) -> T {
    let full = T::from(360.0).unwrap_or_else(T::zero);
    let wrapped = angle % full;
    if wrapped < T::zero() {
        wrapped + full
    } else {
        wrapped
    }
}

/// Replaces NaN with zero and clamps into `[-1, 1]`.
pub fn sanitize_axis<T: Float>(value: T) -> T {
    if value.is_nan() {
        T::zero()
    } else {
        value.max(-T::one()).min(T::one())
    }
}
