//! Swing: lateral curve through the air, a little extra nip off the pitch

use bevy::prelude::*;

use super::DeliveryStrategy;
use crate::constants::PITCH_AXIS;
use crate::helpers::{horizontal, lateral_axis, rotate_about_y, signed_horizontal_angle};
use crate::tuning::DeliveryConfig;

#[derive(Debug, Clone, Copy, Default)]
pub struct SwingDelivery;

impl DeliveryStrategy for SwingDelivery {
    fn name(&self) -> &'static str {
        "Swing"
    }

    /// Swing flight is ballistic, no drag.
    fn initialize(&self, _config: &DeliveryConfig, _velocity: Vec3, _strength: f32) -> f32 {
        0.0
    }

    fn mid_air_adjust(
        &self,
        config: &DeliveryConfig,
        velocity: Vec3,
        strength: f32,
        direction: f32,
    ) -> Vec3 {
        lateral_axis(velocity) * direction * config.max_swing_force * strength
    }

    fn resolve_bounce(
        &self,
        config: &DeliveryConfig,
        incoming: Vec3,
        _normal: Vec3,
        strength: f32,
        _direction: f32,
    ) -> Vec3 {
        let vertical = incoming.y;
        let flat = horizontal(incoming);
        let speed = flat.length();
        if speed <= f32::EPSILON {
            return Vec3::new(0.0, vertical, 0.0);
        }

        // Nip: keep turning the way the ball was already travelling
        let angle = signed_horizontal_angle(PITCH_AXIS, flat);
        let nipped = angle * (1.0 + config.swing_nip_factor * strength);
        let heading = rotate_about_y(PITCH_AXIS, nipped);

        let out = heading * speed * (1.0 - config.pitch_friction);
        Vec3::new(out.x, vertical, out.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mid_air_force_scales_with_strength_and_direction() {
        let config = DeliveryConfig::default();
        let v = Vec3::new(0.0, -2.0, 30.0);
        let full = SwingDelivery.mid_air_adjust(&config, v, 1.0, 1.0);
        assert!((full - Vec3::X * config.max_swing_force).length() < 1e-4);

        let half_in = SwingDelivery.mid_air_adjust(&config, v, 0.5, -1.0);
        assert!((half_in.x + config.max_swing_force * 0.5).abs() < 1e-4);

        let none = SwingDelivery.mid_air_adjust(&config, v, 0.0, 1.0);
        assert_eq!(none, Vec3::ZERO);
    }

    #[test]
    fn test_zero_strength_bounce_keeps_heading() {
        let config = DeliveryConfig::default();
        let incoming = Vec3::new(2.0, 4.0, 25.0);
        let out = SwingDelivery.resolve_bounce(&config, incoming, Vec3::Y, 0.0, 1.0);

        assert_eq!(out.y, incoming.y);
        let in_angle = signed_horizontal_angle(PITCH_AXIS, incoming);
        let out_angle = signed_horizontal_angle(PITCH_AXIS, out);
        assert!((in_angle - out_angle).abs() < 1e-5);
        let expected = horizontal(incoming).length() * (1.0 - config.pitch_friction);
        assert!((horizontal(out).length() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_full_strength_bounce_amplifies_curve() {
        let config = DeliveryConfig::default();
        let incoming = Vec3::new(-3.0, 4.0, 25.0);
        let out = SwingDelivery.resolve_bounce(&config, incoming, Vec3::Y, 1.0, -1.0);

        let in_angle = signed_horizontal_angle(PITCH_AXIS, incoming);
        let out_angle = signed_horizontal_angle(PITCH_AXIS, out);
        assert!(out_angle < in_angle);
        assert!((out_angle - in_angle * (1.0 + config.swing_nip_factor)).abs() < 1e-4);
    }
}
