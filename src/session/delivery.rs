//! Per-delivery orchestration: locked inputs, side flip, launch

use std::f32::consts::TAU;

use bevy::log::{debug, info, warn};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ball::{BallState, FinishReason, FlightSimulator};
use crate::constants::DIRECTION_INPUT_RANGE;
use crate::strategy::DeliveryKind;
use crate::trajectory::{TrajectorySolution, solve_launch};
use crate::tuning::{BowlingSide, DeliveryConfig};

/// What the bowler asked for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryIntent {
    pub target_position: Vec3,
    /// 0..1
    pub strength: f32,
    /// -1..1
    pub direction: f32,
    pub kind: DeliveryKind,
    pub over_the_wicket: bool,
}

/// How a delivery was launched
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchReport {
    pub intent: DeliveryIntent,
    /// Target after scatter, at ground level
    pub scattered_target: Vec3,
    /// Where the ball centre was aimed (target + radius)
    pub aim_point: Vec3,
    pub release_point: Vec3,
    pub speed: f32,
    pub acceleration: Vec3,
    pub solution: TrajectorySolution,
}

/// How a delivery ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryOutcome {
    pub reason: FinishReason,
    pub position: Vec3,
    pub pitch_point: Option<Vec3>,
    pub flight_time: f32,
    pub ground_contacts: u32,
}

#[derive(Resource, Debug, Clone)]
pub struct DeliverySession {
    kind: DeliveryKind,
    side: BowlingSide,
    /// Direction as stored, before the side flip is undone for display
    stored_direction: f32,
    release_speed: f32,
    locked_target: Option<Vec3>,
    locked_strength: Option<f32>,
    last_intent: Option<DeliveryIntent>,
    last_launch: Option<LaunchReport>,
    last_outcome: Option<DeliveryOutcome>,
    deliveries: u32,
    rng: StdRng,
}

impl Default for DeliverySession {
    fn default() -> Self {
        Self::new(&DeliveryConfig::default(), 0)
    }
}

impl DeliverySession {
    pub fn new(config: &DeliveryConfig, seed: u64) -> Self {
        Self {
            kind: DeliveryKind::default(),
            side: BowlingSide::default(),
            stored_direction: 0.0,
            release_speed: config.default_spin_speed,
            locked_target: None,
            locked_strength: None,
            last_intent: None,
            last_launch: None,
            last_outcome: None,
            deliveries: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn kind(&self) -> DeliveryKind {
        self.kind
    }

    pub fn side(&self) -> BowlingSide {
        self.side
    }

    pub fn release_speed(&self) -> f32 {
        self.release_speed
    }

    pub fn locked_target(&self) -> Option<Vec3> {
        self.locked_target
    }

    pub fn locked_strength(&self) -> Option<f32> {
        self.locked_strength
    }

    pub fn last_intent(&self) -> Option<&DeliveryIntent> {
        self.last_intent.as_ref()
    }

    pub fn last_launch(&self) -> Option<&LaunchReport> {
        self.last_launch.as_ref()
    }

    pub fn last_outcome(&self) -> Option<&DeliveryOutcome> {
        self.last_outcome.as_ref()
    }

    /// Deliveries bowled this session
    pub fn deliveries(&self) -> u32 {
        self.deliveries
    }

    /// Release point for the current side and style
    pub fn release_point(&self, config: &DeliveryConfig) -> Vec3 {
        config.release_point(self.side, self.kind)
    }

    pub fn set_kind(&mut self, kind: DeliveryKind) {
        self.kind = kind;
    }

    pub fn toggle_side(&mut self) -> BowlingSide {
        self.side = self.side.flipped();
        debug!("Bowling {} the wicket", self.side.name());
        self.side
    }

    /// Spin speed slider. Clamped to the configured speed range.
    pub fn set_release_speed(&mut self, speed: f32, config: &DeliveryConfig) {
        self.release_speed = speed.clamp(config.min_ball_speed, config.max_ball_speed);
    }

    /// UI slider value in -100..100. Stored mirrored when bowling around the
    /// wicket so the displayed value keeps its sign convention.
    pub fn set_direction_from_ui(&mut self, ui_value: f32) {
        let normalized = (ui_value / DIRECTION_INPUT_RANGE).clamp(-1.0, 1.0);
        self.stored_direction = if self.side.is_over() {
            normalized
        } else {
            -normalized
        };
    }

    /// Direction as shown on the slider, -1..1
    pub fn displayed_direction(&self) -> f32 {
        if self.side.is_over() {
            self.stored_direction
        } else {
            -self.stored_direction
        }
    }

    /// Direction handed to the strategy
    pub fn effective_direction(&self) -> f32 {
        self.displayed_direction()
    }

    pub fn set_locked_strength(&mut self, strength: f32) {
        self.locked_strength = Some(strength.clamp(0.0, 1.0));
    }

    pub fn set_locked_target(&mut self, target: Vec3) {
        self.locked_target = Some(target);
    }

    /// Both the target and the strength are locked and unused
    pub fn is_ready(&self) -> bool {
        self.locked_target.is_some() && self.locked_strength.is_some()
    }

    /// Solve and launch. Does nothing unless ready and the ball is Idle.
    pub fn execute_bowl(
        &mut self,
        simulator: &mut FlightSimulator,
        config: &DeliveryConfig,
    ) -> Option<LaunchReport> {
        if simulator.state() != BallState::Idle {
            debug!("Bowl ignored, ball is {}", simulator.state().name());
            return None;
        }
        let (Some(target), Some(strength)) = (self.locked_target, self.locked_strength) else {
            debug!("Bowl ignored, target or strength not locked");
            return None;
        };

        let intent = DeliveryIntent {
            target_position: target,
            strength,
            direction: self.effective_direction(),
            kind: self.kind,
            over_the_wicket: self.side.is_over(),
        };

        let scattered_target = target + self.scatter_offset(config.target_scatter * (1.0 - strength));
        let aim_point = scattered_target + Vec3::Y * config.ball_radius;
        let release_point = self.release_point(config);
        let displacement = aim_point - release_point;
        let speed = config.delivery_speed(self.kind, self.release_speed);

        let strategy = self.kind.strategy();
        let lateral = strategy.mid_air_adjust(config, displacement, strength, intent.direction);
        let acceleration = config.gravity_vector() + lateral;
        let solution = solve_launch(displacement, acceleration, speed);
        if !solution.converged {
            warn!(
                "Launch solve did not converge after {} iterations (speed {:.2} vs {:.2})",
                solution.iterations,
                solution.speed(),
                speed
            );
        }

        let launched = simulator.start_delivery(
            strategy,
            strength,
            intent.direction,
            solution.initial_velocity,
            acceleration,
            release_point,
            config,
        );
        if !launched {
            return None;
        }

        // Consumed; a fresh lock is needed for the next delivery
        self.locked_target = None;
        self.locked_strength = None;
        self.last_intent = Some(intent);
        self.deliveries += 1;
        info!(
            "Delivery {}: {} {} the wicket to ({:.2}, {:.2}) strength {:.2} direction {:.2}",
            self.deliveries,
            self.kind.name(),
            self.side.name(),
            scattered_target.x,
            scattered_target.z,
            strength,
            intent.direction
        );

        let report = LaunchReport {
            intent,
            scattered_target,
            aim_point,
            release_point,
            speed,
            acceleration,
            solution,
        };
        self.last_launch = Some(report);
        Some(report)
    }

    pub fn record_outcome(&mut self, outcome: DeliveryOutcome) {
        self.last_outcome = Some(outcome);
    }

    /// Drop stale locks ahead of the next delivery
    pub fn clear_locks(&mut self) {
        self.locked_target = None;
        self.locked_strength = None;
    }

    /// Uniform point in a horizontal disc of `radius`
    fn scatter_offset(&mut self, radius: f32) -> Vec3 {
        if radius <= 0.0 {
            return Vec3::ZERO;
        }
        let angle = self.rng.gen_range(0.0..TAU);
        let distance = radius * self.rng.gen_range(0.0_f32..1.0).sqrt();
        Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance)
    }
}
