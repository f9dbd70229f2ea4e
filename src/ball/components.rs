//! Ball flight state and the data the simulator reports

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::world::SurfaceCategory;

/// Ball state - Idle, MidAir, Bounced, or Finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallState {
    #[default]
    Idle,
    MidAir,
    Bounced,
    Finished,
}

impl BallState {
    pub fn name(&self) -> &'static str {
        match self {
            BallState::Idle => "idle",
            BallState::MidAir => "mid_air",
            BallState::Bounced => "bounced",
            BallState::Finished => "finished",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "idle" => Some(BallState::Idle),
            "mid_air" | "midair" => Some(BallState::MidAir),
            "bounced" => Some(BallState::Bounced),
            "finished" => Some(BallState::Finished),
            _ => None,
        }
    }

    /// MidAir or Bounced
    pub fn in_flight(&self) -> bool {
        matches!(self, BallState::MidAir | BallState::Bounced)
    }
}

/// Why a delivery ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinishReason {
    HitWicket,
    HitBoundary,
    CameToRest,
    SafetyCutoff,
}

impl FinishReason {
    pub fn name(&self) -> &'static str {
        match self {
            FinishReason::HitWicket => "hit_wicket",
            FinishReason::HitBoundary => "hit_boundary",
            FinishReason::CameToRest => "came_to_rest",
            FinishReason::SafetyCutoff => "safety_cutoff",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hit_wicket" | "wicket" => Some(FinishReason::HitWicket),
            "hit_boundary" | "boundary" => Some(FinishReason::HitBoundary),
            "came_to_rest" | "rest" => Some(FinishReason::CameToRest),
            "safety_cutoff" | "cutoff" => Some(FinishReason::SafetyCutoff),
            _ => None,
        }
    }

    /// Terminal surfaces map to a reason, the pitch does not
    pub fn from_category(category: SurfaceCategory) -> Option<Self> {
        match category {
            SurfaceCategory::Wicket => Some(FinishReason::HitWicket),
            SurfaceCategory::Boundary => Some(FinishReason::HitBoundary),
            SurfaceCategory::Pitch => None,
        }
    }
}

/// Closed-form description of the pre-bounce flight.
/// `P(t) = start + v0·t + ½·a·t²`, with `t = time_alive`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightFrame {
    pub start_position: Vec3,
    pub initial_velocity: Vec3,
    pub constant_acceleration: Vec3,
    pub time_alive: f32,
    pub last_frame_velocity: Vec3,
}

/// Transitions and notable moments, queued until the owner drains them
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightEvent {
    StateChanged {
        from: BallState,
        to: BallState,
    },
    Bounced {
        position: Vec3,
        incoming: Vec3,
        outgoing: Vec3,
    },
    Finished {
        reason: FinishReason,
        position: Vec3,
    },
    /// The ground probe found nothing below the ball
    MissingGround {
        position: Vec3,
    },
}
