//! Surface categories and hit results

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// What the ball touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceCategory {
    Pitch,
    Wicket,
    Boundary,
}

impl SurfaceCategory {
    /// Wicket and boundary contacts end the delivery
    pub fn is_terminal(&self) -> bool {
        matches!(self, SurfaceCategory::Wicket | SurfaceCategory::Boundary)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SurfaceCategory::Pitch => "pitch",
            SurfaceCategory::Wicket => "wicket",
            SurfaceCategory::Boundary => "boundary",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pitch" | "ground" => Some(SurfaceCategory::Pitch),
            "wicket" | "stumps" => Some(SurfaceCategory::Wicket),
            "boundary" => Some(SurfaceCategory::Boundary),
            _ => None,
        }
    }
}

/// Result of a probe or sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Contact point (for sweeps, the sphere centre at contact)
    pub point: Vec3,
    /// Surface normal at the contact, unit length
    pub normal: Vec3,
    /// Distance travelled from the query origin
    pub distance: f32,
    pub category: SurfaceCategory,
}
