//! Outbound event definitions

use serde::{Deserialize, Serialize};

use crate::accuracy::AccuracyTier;
use crate::ball::{BallState, FinishReason};
use crate::strategy::DeliveryKind;
use crate::tuning::BowlingSide;

/// Everything the bowling core reports to the host.
/// Vectors are `(x, y, z)` tuples so events serialize as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BowlingEvent {
    /// Meter stopped and scored
    AccuracyScored {
        tier: AccuracyTier,
        phase: f32,
        value: f32,
    },
    /// Bounce marker locked as the target
    TargetLocked { position: (f32, f32, f32) },
    /// Launch solved and the ball released
    DeliveryStarted {
        kind: DeliveryKind,
        side: BowlingSide,
        target: (f32, f32, f32),
        strength: f32,
        direction: f32,
        speed: f32,
        converged: bool,
        iterations: u32,
    },
    BallStateChanged { from: BallState, to: BallState },
    /// The pitching bounce
    BallBounced {
        position: (f32, f32, f32),
        incoming: (f32, f32, f32),
        outgoing: (f32, f32, f32),
    },
    DeliveryFinished {
        reason: FinishReason,
        position: (f32, f32, f32),
        flight_time: f32,
    },
    /// Recoverable problem (missing ground, non-convergence)
    Diagnostic { message: String },
}

impl BowlingEvent {
    /// Short code used by the text log format
    pub fn type_code(&self) -> &'static str {
        match self {
            BowlingEvent::AccuracyScored { .. } => "AS",
            BowlingEvent::TargetLocked { .. } => "TL",
            BowlingEvent::DeliveryStarted { .. } => "DS",
            BowlingEvent::BallStateChanged { .. } => "SC",
            BowlingEvent::BallBounced { .. } => "BB",
            BowlingEvent::DeliveryFinished { .. } => "DF",
            BowlingEvent::Diagnostic { .. } => "DG",
        }
    }
}
