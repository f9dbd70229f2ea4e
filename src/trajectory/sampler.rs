//! Closed-form path evaluation, used by the simulator and for drawing the
//! predicted path.

use bevy::prelude::*;

use super::TrajectorySolution;

/// Upper bound on samples per path
pub const MAX_PATH_SAMPLES: usize = 1024;

/// `P(t) = P0 + V0·t + ½·a·t²`
pub fn position_at(start: Vec3, initial_velocity: Vec3, acceleration: Vec3, t: f32) -> Vec3 {
    start + initial_velocity * t + 0.5 * acceleration * t * t
}

/// `V(t) = V0 + a·t`
pub fn velocity_at(initial_velocity: Vec3, acceleration: Vec3, t: f32) -> Vec3 {
    initial_velocity + acceleration * t
}

/// Sample the launch parabola from release to the target at `step` spacing.
/// The last sample is always the target point itself.
pub fn sample_path(
    start: Vec3,
    solution: &TrajectorySolution,
    acceleration: Vec3,
    step: f32,
) -> Vec<Vec3> {
    let duration = solution.time_of_flight;
    if duration <= 0.0 || step <= 0.0 {
        return vec![start];
    }

    let count = ((duration / step).ceil() as usize).clamp(1, MAX_PATH_SAMPLES);
    let mut points = Vec::with_capacity(count + 1);
    for i in 0..=count {
        let t = duration * i as f32 / count as f32;
        points.push(position_at(start, solution.initial_velocity, acceleration, t));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::solve_launch;

    #[test]
    fn test_sampled_path_ends_on_target() {
        let gravity = Vec3::new(0.0, -9.81, 0.0);
        let start = Vec3::new(0.0, 2.0, 0.0);
        let target = Vec3::new(0.2, 0.036, 15.0);
        let solution = solve_launch(target - start, gravity, 25.0);
        let path = sample_path(start, &solution, gravity, 0.01);

        assert!(path.len() > 10);
        assert_eq!(path[0], start);
        assert!((path[path.len() - 1] - target).length() < 1e-2);
        // Monotonic progress down the pitch
        assert!(path.windows(2).all(|w| w[1].z >= w[0].z));
    }

    #[test]
    fn test_zero_duration_path() {
        let solution = solve_launch(Vec3::ZERO, Vec3::ZERO, 10.0);
        assert_eq!(sample_path(Vec3::ONE, &solution, Vec3::ZERO, 0.1), vec![Vec3::ONE]);
    }
}
