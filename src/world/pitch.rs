//! Reference pitch geometry: flat ground, one set of stumps, boundary walls

use bevy::prelude::*;

use super::{CollisionWorld, SurfaceCategory, SurfaceHit};
use crate::constants::*;

/// Horizontal ground plane with a finite rectangular extent on X/Z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    pub height: f32,
    /// (min x, min z)
    pub min: Vec2,
    /// (max x, max z)
    pub max: Vec2,
}

impl GroundPlane {
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.y && z <= self.max.y
    }
}

/// Axis-aligned box obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub min: Vec3,
    pub max: Vec3,
    pub category: SurfaceCategory,
}

impl Obstacle {
    pub fn new(min: Vec3, max: Vec3, category: SurfaceCategory) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
            category,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PitchWorld {
    pub ground: Option<GroundPlane>,
    pub obstacles: Vec<Obstacle>,
}

impl PitchWorld {
    /// Ground, the batter's stumps and three boundary walls
    pub fn standard() -> Self {
        let far_z = STUMPS_Z + BOUNDARY_DISTANCE;
        let stumps = Obstacle::new(
            Vec3::new(-STUMPS_HALF_WIDTH, 0.0, STUMPS_Z - STUMPS_DEPTH / 2.0),
            Vec3::new(STUMPS_HALF_WIDTH, STUMPS_HEIGHT, STUMPS_Z + STUMPS_DEPTH / 2.0),
            SurfaceCategory::Wicket,
        );
        let far_wall = Obstacle::new(
            Vec3::new(-BOUNDARY_DISTANCE, 0.0, far_z),
            Vec3::new(BOUNDARY_DISTANCE, BOUNDARY_HEIGHT, far_z + BOUNDARY_THICKNESS),
            SurfaceCategory::Boundary,
        );
        let left_wall = Obstacle::new(
            Vec3::new(-BOUNDARY_DISTANCE - BOUNDARY_THICKNESS, 0.0, GROUND_MIN_Z),
            Vec3::new(-BOUNDARY_DISTANCE, BOUNDARY_HEIGHT, far_z + BOUNDARY_THICKNESS),
            SurfaceCategory::Boundary,
        );
        let right_wall = Obstacle::new(
            Vec3::new(BOUNDARY_DISTANCE, 0.0, GROUND_MIN_Z),
            Vec3::new(BOUNDARY_DISTANCE + BOUNDARY_THICKNESS, BOUNDARY_HEIGHT, far_z + BOUNDARY_THICKNESS),
            SurfaceCategory::Boundary,
        );

        Self {
            ground: Some(GroundPlane {
                height: 0.0,
                min: Vec2::new(-GROUND_HALF_WIDTH, GROUND_MIN_Z),
                max: Vec2::new(GROUND_HALF_WIDTH, GROUND_MAX_Z),
            }),
            obstacles: vec![stumps, far_wall, left_wall, right_wall],
        }
    }

    /// Standard obstacles, no ground at all
    pub fn without_ground() -> Self {
        Self {
            ground: None,
            ..Self::standard()
        }
    }

    /// Standard world with the stumps removed
    pub fn without_stumps() -> Self {
        let mut world = Self::standard();
        world
            .obstacles
            .retain(|o| o.category != SurfaceCategory::Wicket);
        world
    }

    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }
}

impl CollisionWorld for PitchWorld {
    fn probe_ground(&self, origin: Vec3, max_distance: f32) -> Option<SurfaceHit> {
        let ground = self.ground?;
        if !ground.contains(origin.x, origin.z) {
            return None;
        }
        // Downward ray only sees the upper face
        let distance = origin.y - ground.height;
        if distance < 0.0 || distance > max_distance {
            return None;
        }
        Some(SurfaceHit {
            point: Vec3::new(origin.x, ground.height, origin.z),
            normal: Vec3::Y,
            distance,
            category: SurfaceCategory::Pitch,
        })
    }

    fn sweep_sphere(&self, from: Vec3, to: Vec3, radius: f32) -> Option<SurfaceHit> {
        let delta = to - from;
        let length = delta.length();
        let mut best: Option<SurfaceHit> = None;

        for obstacle in &self.obstacles {
            let min = obstacle.min - Vec3::splat(radius);
            let max = obstacle.max + Vec3::splat(radius);
            let Some((t, normal)) = segment_vs_box(from, delta, min, max) else {
                continue;
            };
            let distance = t * length;
            if best.is_some_and(|b| b.distance <= distance) {
                continue;
            }
            best = Some(SurfaceHit {
                point: from + delta * t,
                normal,
                distance,
                category: obstacle.category,
            });
        }

        best
    }
}

/// Slab test of the segment `from + delta * t, t in [0, 1]` against a box.
/// Returns the entry parameter and the normal of the face entered.
/// A segment that starts inside reports t = 0 and a normal against travel.
fn segment_vs_box(from: Vec3, delta: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_enter = 0.0_f32;
    let mut t_exit = 1.0_f32;
    let mut normal = Vec3::ZERO;

    for axis in 0..3 {
        let origin = from[axis];
        let d = delta[axis];
        if d.abs() < f32::EPSILON {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut near = (min[axis] - origin) * inv;
        let mut far = (max[axis] - origin) * inv;
        // Moving in +axis enters through the min face, whose normal faces -axis
        let mut face = -1.0;
        if near > far {
            std::mem::swap(&mut near, &mut far);
            face = 1.0;
        }

        if near > t_enter {
            t_enter = near;
            normal = Vec3::ZERO;
            normal[axis] = face;
        }
        t_exit = t_exit.min(far);
        if t_enter > t_exit {
            return None;
        }
    }

    if normal == Vec3::ZERO {
        normal = -delta.normalize_or_zero();
    }
    Some((t_enter, normal))
}
