//! Tunable constants for bowling
//!
//! Default values for everything in `DeliveryConfig`. Distances are metres,
//! times are seconds, the pitch runs along +Z from the bowler's crease.

use bevy::prelude::*;

// =============================================================================
// BASE PHYSICS
// =============================================================================

pub const GRAVITY: f32 = 9.81;
pub const AIR_DRAG: f32 = 0.1;
pub const PITCH_FRICTION: f32 = 0.2; // Horizontal speed lost at the bounce (0..1)
pub const RESTITUTION: f32 = 0.6; // Vertical speed retained at the bounce (0..1)
pub const BALL_RADIUS: f32 = 0.036; // 72mm ball
pub const FIXED_TIMESTEP: f32 = 0.02; // 50 Hz physics tick

// =============================================================================
// BALL SPEED
// =============================================================================

pub const MIN_BALL_SPEED: f32 = 15.0;
pub const MAX_BALL_SPEED: f32 = 30.0; // Swing deliveries always use this speed
pub const DEFAULT_SPIN_SPEED: f32 = 20.0;

// =============================================================================
// DELIVERY STYLES
// =============================================================================

pub const MAX_SWING_FORCE: f32 = 15.0; // Lateral acceleration at full strength (m/s²)
pub const SWING_NIP_FACTOR: f32 = 0.5; // Extra travel angle after pitching, at full strength
pub const MAX_SPIN_TURN_ANGLE: f32 = 20.0; // Used as a lateral velocity impulse at the bounce
pub const SPIN_DRAG_MULTIPLIER: f32 = 1.2;

// =============================================================================
// GROUND PROBE / SWEEP
// =============================================================================

pub const PROBE_LIFT: f32 = 0.5; // Probe starts this far above the projected position
pub const PROBE_DISTANCE: f32 = 5.0; // Bounded lookahead below the probe origin
pub const SWEEP_RADIUS_FACTOR: f32 = 0.5; // Secondary sweep uses a smaller sphere
pub const CROSSING_EPSILON: f32 = 1e-5;

// =============================================================================
// POST-BOUNCE / TERMINATION
// =============================================================================

pub const SETTLE_VERTICAL_SPEED: f32 = 0.5; // Below this the ball rolls instead of bouncing
pub const REST_SPEED: f32 = 0.2; // Rolling ball below this speed is at rest
pub const MAX_FLIGHT_TIME: f32 = 8.0; // Safety cutoff
pub const FLIGHT_BOUNDS_MIN: Vec3 = Vec3::new(-40.0, -5.0, -10.0);
pub const FLIGHT_BOUNDS_MAX: Vec3 = Vec3::new(40.0, 30.0, 80.0);
pub const TRAIL_CAPACITY: usize = 512;

// =============================================================================
// PITCH GEOMETRY
// =============================================================================

pub const PITCH_AXIS: Vec3 = Vec3::Z;
pub const STUMPS_Z: f32 = 20.12; // Batter's stumps, measured from the release crease
pub const STUMPS_HALF_WIDTH: f32 = 0.114;
pub const STUMPS_HEIGHT: f32 = 0.711;
pub const STUMPS_DEPTH: f32 = 0.04;
pub const BOUNDARY_DISTANCE: f32 = 25.0; // Boundary rope, from the stumps and from the pitch centre line
pub const BOUNDARY_HEIGHT: f32 = 1.0;
pub const BOUNDARY_THICKNESS: f32 = 1.0;
pub const GROUND_HALF_WIDTH: f32 = 30.0; // Extent of the ground the probe can find
pub const GROUND_MIN_Z: f32 = -10.0;
pub const GROUND_MAX_Z: f32 = 50.0;

// =============================================================================
// RELEASE POINTS
// =============================================================================

pub const OVER_THE_WICKET_RELEASE: Vec3 = Vec3::new(-0.4, 2.2, 0.0);
pub const AROUND_THE_WICKET_RELEASE: Vec3 = Vec3::new(0.6, 2.2, 0.0);
pub const SPIN_RELEASE_DROP: f32 = 0.2; // Spinners release slightly lower

// =============================================================================
// ACCURACY METER
// =============================================================================

pub const METER_OSCILLATION_SPEED: f32 = 1.5;
pub const METER_PERFECT_ZONE: f32 = 0.05; // Half-width from centre
pub const METER_GOOD_ZONE: f32 = 0.15;
pub const METER_OKAY_ZONE: f32 = 0.30;
pub const METER_PERFECT_SCORE: f32 = 1.0;
pub const METER_GOOD_SCORE: f32 = 0.70;
pub const METER_OKAY_SCORE: f32 = 0.40;
pub const METER_BAD_SCORE: f32 = 0.10;

// =============================================================================
// BOUNCE MARKER
// =============================================================================

pub const MARKER_MOVE_SPEED: f32 = 5.0;
pub const MARKER_MIN: Vec3 = Vec3::new(-1.5, 0.0, 8.0);
pub const MARKER_MAX: Vec3 = Vec3::new(1.5, 0.0, 18.0);
pub const MARKER_START: Vec3 = Vec3::new(0.0, 0.0, 14.0);
pub const MARKER_INPUT_DEADZONE: f32 = 0.01; // Squared length

// =============================================================================
// SESSION
// =============================================================================

pub const TARGET_SCATTER: f32 = 0.25; // Target scatter radius at zero strength
pub const DIRECTION_INPUT_RANGE: f32 = 100.0; // UI direction slider is -100..100
