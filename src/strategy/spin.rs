//! Spin: straight onto the pitch, then a sharp turn off it

use bevy::prelude::*;

use super::DeliveryStrategy;
use crate::helpers::{horizontal, lateral_axis};
use crate::tuning::DeliveryConfig;

#[derive(Debug, Clone, Copy, Default)]
pub struct SpinDelivery;

impl DeliveryStrategy for SpinDelivery {
    fn name(&self) -> &'static str {
        "Spin"
    }

    fn initialize(&self, config: &DeliveryConfig, _velocity: Vec3, _strength: f32) -> f32 {
        config.air_drag * config.spin_drag_multiplier
    }

    /// No drift before pitching
    fn mid_air_adjust(
        &self,
        _config: &DeliveryConfig,
        _velocity: Vec3,
        _strength: f32,
        _direction: f32,
    ) -> Vec3 {
        Vec3::ZERO
    }

    fn resolve_bounce(
        &self,
        config: &DeliveryConfig,
        incoming: Vec3,
        _normal: Vec3,
        strength: f32,
        direction: f32,
    ) -> Vec3 {
        // Spinners lose pace off the pitch
        let flat = horizontal(incoming) * (1.0 - config.pitch_friction);

        // The snap turn, orthogonal to travel
        let turn = lateral_axis(incoming) * direction * config.max_spin_turn_angle * strength;

        Vec3::new(flat.x + turn.x, incoming.y, flat.z + turn.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_strength_adds_no_turn() {
        let config = DeliveryConfig::default();
        let incoming = Vec3::new(0.5, 3.0, 18.0);
        let out = SpinDelivery.resolve_bounce(&config, incoming, Vec3::Y, 0.0, 1.0);

        let expected = horizontal(incoming) * (1.0 - config.pitch_friction);
        assert!((horizontal(out) - expected).length() < 1e-5);
        assert_eq!(out.y, incoming.y);
        assert!((horizontal(out).normalize() - horizontal(incoming).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_turn_is_lateral_and_signed() {
        let config = DeliveryConfig::default();
        let incoming = Vec3::new(0.0, 3.0, 18.0);
        let off = SpinDelivery.resolve_bounce(&config, incoming, Vec3::Y, 1.0, 1.0);
        let leg = SpinDelivery.resolve_bounce(&config, incoming, Vec3::Y, 1.0, -1.0);

        assert!((off.x - config.max_spin_turn_angle).abs() < 1e-4);
        assert!((leg.x + config.max_spin_turn_angle).abs() < 1e-4);
        assert!((off.z - 18.0 * (1.0 - config.pitch_friction)).abs() < 1e-4);
    }

    #[test]
    fn test_no_mid_air_drift() {
        let config = DeliveryConfig::default();
        let drift = SpinDelivery.mid_air_adjust(&config, Vec3::Z * 20.0, 1.0, 1.0);
        assert_eq!(drift, Vec3::ZERO);
        let drag = SpinDelivery.initialize(&config, Vec3::Z, 1.0);
        assert!(drag > 0.0);
    }
}
