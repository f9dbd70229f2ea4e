//! Utility functions for bowling

use bevy::prelude::*;

/// Triangle wave between 0 and `length` (same shape as a ping-pong tween)
pub fn ping_pong(t: f32, length: f32) -> f32 {
    if length <= 0.0 {
        return 0.0;
    }
    let period = length * 2.0;
    let wrapped = t.rem_euclid(period);
    length - (wrapped - length).abs()
}

/// Linear interpolation between two scalars
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Horizontal (XZ-plane) part of a vector
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Unit axis in the horizontal plane orthogonal to the direction of travel.
/// Positive values along it move the ball toward +X when travelling down +Z.
/// Falls back to +X when there is no horizontal motion.
pub fn lateral_axis(travel: Vec3) -> Vec3 {
    let flat = horizontal(travel);
    let axis = Vec3::Y.cross(flat).normalize_or_zero();
    if axis == Vec3::ZERO { Vec3::X } else { axis }
}

/// Signed angle (radians) of a horizontal direction about +Y, measured from
/// `reference`. Positive turns toward +X for a +Z reference.
pub fn signed_horizontal_angle(reference: Vec3, v: Vec3) -> f32 {
    let r = horizontal(reference);
    let f = horizontal(v);
    let cross_y = r.z * f.x - r.x * f.z;
    let dot = r.x * f.x + r.z * f.z;
    cross_y.atan2(dot)
}

/// Rotate a vector about +Y by `angle` radians, in the same sense as
/// `signed_horizontal_angle`.
pub fn rotate_about_y(v: Vec3, angle: f32) -> Vec3 {
    let (sin_a, cos_a) = angle.sin_cos();
    Vec3::new(v.x * cos_a + v.z * sin_a, v.y, v.z * cos_a - v.x * sin_a)
}

/// Tuple form for serialized events
pub fn to_tuple(v: Vec3) -> (f32, f32, f32) {
    (v.x, v.y, v.z)
}
