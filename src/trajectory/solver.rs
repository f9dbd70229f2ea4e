//! Launch solver: find the release velocity that lands on a target at a
//! requested speed under constant acceleration.

use bevy::prelude::*;

use crate::helpers::lerp;

/// Iteration cap for the fixed-point solve
pub const SOLVER_MAX_ITERATIONS: u32 = 20;
/// Absolute speed tolerance (m/s)
pub const SOLVER_SPEED_TOLERANCE: f32 = 0.001;
/// Blend factor toward the rescaled flight time; damps oscillation
pub const SOLVER_DAMPING: f32 = 0.5;

/// Result of a launch solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySolution {
    pub initial_velocity: Vec3,
    pub time_of_flight: f32,
    pub iterations: u32,
    /// False when the iteration cap was hit or the input was degenerate.
    /// The velocity is still the best available approximation.
    pub converged: bool,
}

impl TrajectorySolution {
    pub fn speed(&self) -> f32 {
        self.initial_velocity.length()
    }
}

/// Velocity that covers `displacement` in time `t` under `acceleration`
fn within_tolerance(velocity: Vec3, desired_speed: f32) -> bool {
    (velocity.length() - desired_speed).abs() <= SOLVER_SPEED_TOLERANCE
}

fn velocity_for_time(displacement: Vec3, acceleration: Vec3, t: f32) -> Vec3 {
    (displacement - 0.5 * acceleration * t * t) / t
}

/// Solve for the launch velocity and flight time.
///
/// The flight time depends on the launch velocity and the launch velocity on
/// the flight time, so this iterates: seed `t = |d| / speed`, compute the
/// velocity that hits the target in `t`, then rescale `t` by the ratio of the
/// achieved speed to the desired speed (half-way blend). Stops once the speed
/// is within tolerance or after the iteration cap.
pub fn solve_launch(displacement: Vec3, acceleration: Vec3, desired_speed: f32) -> TrajectorySolution {
    let distance = displacement.length();
    if distance <= f32::EPSILON || desired_speed <= 0.0 || !desired_speed.is_finite() {
        return TrajectorySolution {
            initial_velocity: Vec3::ZERO,
            time_of_flight: 0.0,
            iterations: 0,
            converged: false,
        };
    }

    let mut t = distance / desired_speed;
    let mut velocity = velocity_for_time(displacement, acceleration, t);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < SOLVER_MAX_ITERATIONS {
        iterations += 1;
        let speed = velocity.length();

        if within_tolerance(velocity, desired_speed) {
            converged = true;
            break;
        }

        let rescaled = t * (speed / desired_speed);
        let next_t = lerp(t, rescaled, SOLVER_DAMPING);
        let next_velocity = velocity_for_time(displacement, acceleration, next_t);
        if !next_t.is_finite() || next_t <= f32::EPSILON || !next_velocity.is_finite() {
            // Keep the last finite answer
            break;
        }
        t = next_t;
        velocity = next_velocity;
    }

    // The update on the last pass is never checked inside the loop
    if !converged && within_tolerance(velocity, desired_speed) {
        converged = true;
    }

    TrajectorySolution {
        initial_velocity: velocity,
        time_of_flight: t,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::position_at;

    const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

    #[test]
    fn test_flat_ten_metre_delivery() {
        let start = Vec3::new(0.0, 1.0, 0.0);
        let target = Vec3::new(0.0, 1.0, 10.0);
        let solution = solve_launch(target - start, GRAVITY, 20.0);

        assert!(solution.converged);
        assert!((solution.speed() - 20.0).abs() <= SOLVER_SPEED_TOLERANCE);
        assert!((solution.time_of_flight - 0.5).abs() < 0.01);

        let v = solution.initial_velocity;
        assert!(v.x.abs() < 1e-4);
        assert!((v.z - 20.0).abs() < 0.2);
        // Vertical launch compensates the gravity drop over the flight
        let expected_vy = 0.5 * 9.81 * solution.time_of_flight;
        assert!((v.y - expected_vy).abs() < 1e-3);

        let landing = position_at(start, v, GRAVITY, solution.time_of_flight);
        assert!((landing - target).length() < 1e-3);
    }

    #[test]
    fn test_realistic_deliveries_converge() {
        let start = Vec3::new(-0.4, 2.2, 0.0);
        // Swing pace with lateral force, and the full spin speed range without it
        let cases = [
            (25.0_f32, [-15.0_f32, -5.0, 0.0, 5.0, 15.0]),
            (30.0, [-15.0, -5.0, 0.0, 5.0, 15.0]),
            (15.0, [0.0; 5]),
            (20.0, [0.0; 5]),
        ];
        for (speed, laterals) in cases {
            for lateral in laterals {
                for &length in &[8.0_f32, 12.0, 16.0, 18.0] {
                    let target = Vec3::new(0.3, 0.036, length);
                    let accel = GRAVITY + Vec3::X * lateral;
                    let solution = solve_launch(target - start, accel, speed);
                    assert!(
                        solution.converged,
                        "speed {} lateral {} length {}",
                        speed, lateral, length
                    );
                    assert!((solution.speed() - speed).abs() <= SOLVER_SPEED_TOLERANCE);
                    let landing =
                        position_at(start, solution.initial_velocity, accel, solution.time_of_flight);
                    assert!((landing - target).length() < 1e-2);
                }
            }
        }
    }

    #[test]
    fn test_degenerate_inputs_do_not_fail() {
        let zero = solve_launch(Vec3::ZERO, GRAVITY, 20.0);
        assert!(!zero.converged);
        assert_eq!(zero.initial_velocity, Vec3::ZERO);

        let stopped = solve_launch(Vec3::Z * 10.0, GRAVITY, 0.0);
        assert!(!stopped.converged);
        assert_eq!(stopped.time_of_flight, 0.0);
    }

    #[test]
    fn test_converged_flag_matches_final_velocity() {
        // Slow launches need most of the iteration budget
        let start = Vec3::new(0.0, 2.2, 0.0);
        for speed in [9.0_f32, 9.5, 10.0, 11.0, 12.5, 14.0, 16.0, 22.0, 35.0] {
            for length in [6.0_f32, 10.0, 14.0, 18.0, 22.0] {
                let displacement = Vec3::new(0.2, 0.036, length) - start;
                let solution = solve_launch(displacement, GRAVITY, speed);
                let close = (solution.speed() - speed).abs() <= SOLVER_SPEED_TOLERANCE;
                assert_eq!(
                    solution.converged, close,
                    "speed {} length {} after {} iterations",
                    speed, length, solution.iterations
                );
            }
        }
    }

    #[test]
    fn test_unreachable_speed_stays_finite() {
        // Far too slow to cover 20m against gravity: best effort, never NaN
        let solution = solve_launch(Vec3::new(0.0, 0.0, 20.0), GRAVITY, 2.0);
        assert!(solution.initial_velocity.is_finite());
        assert!(solution.time_of_flight.is_finite());
        assert!(solution.iterations <= SOLVER_MAX_ITERATIONS);
    }
}
