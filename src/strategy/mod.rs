//! Delivery styles - how swing and spin perturb a delivery
//!
//! Every style is a `DeliveryStrategy`. The simulator only talks to the trait,
//! so a new style needs no changes to the flight loop.

mod spin;
mod swing;

pub use spin::SpinDelivery;
pub use swing::SwingDelivery;

use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::tuning::DeliveryConfig;

/// Contract for a delivery style.
///
/// All three operations are pure: the same inputs give the same outputs.
/// `strength` is the 0..1 accuracy/strength scalar, `direction` the signed
/// -1..1 control value. A strength of 0 turns the style's effect off.
pub trait DeliveryStrategy: Send + Sync {
    /// Name for logs and reports
    fn name(&self) -> &'static str;

    /// Air resistance for this delivery, applied after the bounce
    fn initialize(&self, config: &DeliveryConfig, velocity: Vec3, strength: f32) -> f32;

    /// Constant lateral acceleration folded into the launch solve
    fn mid_air_adjust(
        &self,
        config: &DeliveryConfig,
        velocity: Vec3,
        strength: f32,
        direction: f32,
    ) -> Vec3;

    /// Outgoing velocity after pitching. The caller has already applied
    /// restitution to the vertical component.
    fn resolve_bounce(
        &self,
        config: &DeliveryConfig,
        incoming: Vec3,
        normal: Vec3,
        strength: f32,
        direction: f32,
    ) -> Vec3;
}

/// Built-in delivery styles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryKind {
    #[default]
    Swing,
    Spin,
}

impl DeliveryKind {
    pub const ALL: [DeliveryKind; 2] = [DeliveryKind::Swing, DeliveryKind::Spin];

    pub fn name(&self) -> &'static str {
        match self {
            DeliveryKind::Swing => "swing",
            DeliveryKind::Spin => "spin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "swing" => Some(DeliveryKind::Swing),
            "spin" => Some(DeliveryKind::Spin),
            _ => None,
        }
    }

    /// Strategy implementing this style
    pub fn strategy(&self) -> Arc<dyn DeliveryStrategy> {
        match self {
            DeliveryKind::Swing => Arc::new(SwingDelivery),
            DeliveryKind::Spin => Arc::new(SpinDelivery),
        }
    }
}
