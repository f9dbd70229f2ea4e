//! Inbound commands from input and UI

use bevy::prelude::*;

use crate::strategy::DeliveryKind;

/// One input to the bowling core
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BowlingCommand {
    SetDeliveryType(DeliveryKind),
    ToggleSide,
    /// Accuracy/strength value 0..1, as if scored by the meter
    SetStrengthValue(f32),
    /// Locked bounce target, bypassing the marker
    SetBounceTarget(Vec3),
    /// UI direction slider, -100..100
    SetDirectionInput(f32),
    /// Spin speed slider
    SetReleaseSpeed(f32),
    /// Continuous aim vector for the marker
    MoveMarker(Vec2),
    /// First tap: stop the meter and lock the marker
    Lock,
    /// Second tap: bowl if locked
    Execute,
    /// Bowl directly if the session is ready
    ExecuteBowl,
    StartAccuracyGate,
    StopAccuracyGate,
}

impl BowlingCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BowlingCommand::SetDeliveryType(_) => "set_delivery_type",
            BowlingCommand::ToggleSide => "toggle_side",
            BowlingCommand::SetStrengthValue(_) => "set_strength",
            BowlingCommand::SetBounceTarget(_) => "set_target",
            BowlingCommand::SetDirectionInput(_) => "set_direction",
            BowlingCommand::SetReleaseSpeed(_) => "set_release_speed",
            BowlingCommand::MoveMarker(_) => "move_marker",
            BowlingCommand::Lock => "lock",
            BowlingCommand::Execute => "execute",
            BowlingCommand::ExecuteBowl => "execute_bowl",
            BowlingCommand::StartAccuracyGate => "start_gate",
            BowlingCommand::StopAccuracyGate => "stop_gate",
        }
    }
}

/// Commands waiting for the next fixed tick
#[derive(Resource, Debug, Default)]
pub struct CommandQueue {
    pending: Vec<BowlingCommand>,
}

impl CommandQueue {
    pub fn push(&mut self, command: BowlingCommand) {
        self.pending.push(command);
    }

    pub fn push_all(&mut self, commands: impl IntoIterator<Item = BowlingCommand>) {
        self.pending.extend(commands);
    }

    /// Take everything queued, in arrival order
    pub fn drain(&mut self) -> Vec<BowlingCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
