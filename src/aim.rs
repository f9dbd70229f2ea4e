//! Aiming: the bounce marker and the two-tap lock/execute sequence

use bevy::log::debug;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::MARKER_INPUT_DEADZONE;
use crate::tuning::DeliveryConfig;

/// Target marker on the pitch, steered by the aim vector until locked
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct BounceMarker {
    position: Vec3,
    move_direction: Vec2,
    active: bool,
}

impl Default for BounceMarker {
    fn default() -> Self {
        Self::new(&DeliveryConfig::default())
    }
}

impl BounceMarker {
    pub fn new(config: &DeliveryConfig) -> Self {
        Self {
            position: Vec3::from_array(config.marker_start),
            move_direction: Vec2::ZERO,
            active: true,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn is_locked(&self) -> bool {
        !self.active
    }

    /// Aim input: x steers across the pitch, y along it. Ignored once locked.
    pub fn set_move_direction(&mut self, direction: Vec2) {
        if !self.active {
            return;
        }
        self.move_direction = direction;
    }

    /// Place the marker directly, clamped to the bounds
    pub fn set_position(&mut self, position: Vec3, config: &DeliveryConfig) {
        if !self.active {
            return;
        }
        self.position = clamp_to_bounds(position, config);
    }

    pub fn tick(&mut self, dt: f32, config: &DeliveryConfig) {
        if !self.active || self.move_direction.length_squared() <= MARKER_INPUT_DEADZONE {
            return;
        }
        let step = Vec3::new(self.move_direction.x, 0.0, self.move_direction.y)
            * config.marker_move_speed
            * dt;
        self.position = clamp_to_bounds(self.position + step, config);
    }

    /// Freeze the marker and hand back the target
    pub fn lock(&mut self) -> Vec3 {
        self.active = false;
        self.move_direction = Vec2::ZERO;
        self.position
    }

    /// Re-activate for the next delivery. The position is kept.
    pub fn reset(&mut self) {
        self.active = true;
        self.move_direction = Vec2::ZERO;
    }
}

fn clamp_to_bounds(position: Vec3, config: &DeliveryConfig) -> Vec3 {
    let min = Vec3::from_array(config.marker_min);
    let max = Vec3::from_array(config.marker_max);
    Vec3::new(
        position.x.clamp(min.x, max.x),
        position.y,
        position.z.clamp(min.z, max.z),
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TapState {
    #[default]
    WaitingForLock,
    Locked,
}

/// First tap locks accuracy and target, second tap bowls
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TapSequence {
    state: TapState,
}

impl TapSequence {
    pub fn state(&self) -> TapState {
        self.state
    }

    /// True when this press performed the lock
    pub fn press_lock(&mut self) -> bool {
        match self.state {
            TapState::WaitingForLock => {
                self.state = TapState::Locked;
                true
            }
            TapState::Locked => {
                debug!("Lock pressed again, already locked");
                false
            }
        }
    }

    /// True when this press should bowl
    pub fn press_execute(&mut self) -> bool {
        match self.state {
            TapState::Locked => true,
            TapState::WaitingForLock => {
                debug!("Execute pressed before lock, ignoring");
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = TapState::WaitingForLock;
    }
}
