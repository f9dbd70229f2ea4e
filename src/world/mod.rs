//! Collision world the delivery is simulated against
//!
//! The simulator only talks to the `CollisionWorld` trait: a bounded downward
//! ground probe and a sphere sweep against obstacles. `PitchWorld` is the
//! reference implementation used by the plugin, the headless rig and tests.

mod pitch;
mod surface;

pub use pitch::*;
pub use surface::*;

use bevy::prelude::*;

/// Geometry queries needed by the flight simulator
pub trait CollisionWorld: Send + Sync {
    /// Cast straight down from `origin`, at most `max_distance`.
    /// Only walkable ground (category `Pitch`) is reported.
    fn probe_ground(&self, origin: Vec3, max_distance: f32) -> Option<SurfaceHit>;

    /// Sweep a sphere of `radius` from `from` to `to` against obstacles
    /// (stumps, boundary). Returns the earliest contact along the segment.
    fn sweep_sphere(&self, from: Vec3, to: Vec3, radius: f32) -> Option<SurfaceHit>;
}

/// The active collision world
#[derive(Resource)]
pub struct CollisionScene(pub Box<dyn CollisionWorld>);

impl Default for CollisionScene {
    fn default() -> Self {
        Self(Box::new(PitchWorld::standard()))
    }
}

impl CollisionScene {
    pub fn new(world: impl CollisionWorld + 'static) -> Self {
        Self(Box::new(world))
    }

    pub fn world(&self) -> &dyn CollisionWorld {
        self.0.as_ref()
    }
}
