//! Flight simulator - closed-form flight onto the pitch, integrated after it
//!
//! Before the bounce the position is always evaluated from the launch
//! parabola, never accumulated, so the ball lands where the solver aimed it.
//! Once it has pitched the ball switches to plain integration with gravity,
//! the style's drag and, when rolling, pitch friction.

use std::collections::VecDeque;
use std::sync::Arc;

use bevy::log::{debug, info, warn};
use bevy::prelude::*;

use crate::ball::components::*;
use crate::constants::*;
use crate::helpers::horizontal;
use crate::strategy::DeliveryStrategy;
use crate::trajectory::{position_at, velocity_at};
use crate::tuning::DeliveryConfig;
use crate::world::{CollisionWorld, SurfaceCategory, SurfaceHit};

/// Drives one ball through Idle -> MidAir -> Bounced -> Finished
#[derive(Resource)]
pub struct FlightSimulator {
    state: BallState,
    position: Vec3,
    velocity: Vec3,
    frame: FlightFrame,
    strategy: Option<Arc<dyn DeliveryStrategy>>,
    strength: f32,
    direction: f32,
    drag: f32,
    rolling: bool,
    pitch_point: Option<Vec3>,
    ground_contacts: u32,
    finish_reason: Option<FinishReason>,
    missing_ground_reported: bool,
    events: Vec<FlightEvent>,
    trail: VecDeque<Vec3>,
}

impl Default for FlightSimulator {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl FlightSimulator {
    /// Idle ball resting at `start`
    pub fn new(start: Vec3) -> Self {
        let mut trail = VecDeque::with_capacity(TRAIL_CAPACITY);
        trail.push_back(start);
        Self {
            state: BallState::Idle,
            position: start,
            velocity: Vec3::ZERO,
            frame: FlightFrame {
                start_position: start,
                ..default()
            },
            strategy: None,
            strength: 0.0,
            direction: 0.0,
            drag: 0.0,
            rolling: false,
            pitch_point: None,
            ground_contacts: 0,
            finish_reason: None,
            missing_ground_reported: false,
            events: Vec::new(),
            trail,
        }
    }

    pub fn state(&self) -> BallState {
        self.state
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn frame(&self) -> &FlightFrame {
        &self.frame
    }

    pub fn strategy_name(&self) -> Option<&'static str> {
        self.strategy.as_ref().map(|s| s.name())
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn drag(&self) -> f32 {
        self.drag
    }

    pub fn is_rolling(&self) -> bool {
        self.rolling
    }

    /// Where the ball first pitched, once it has
    pub fn pitch_point(&self) -> Option<Vec3> {
        self.pitch_point
    }

    /// Ground contacts this delivery, the pitching bounce included
    pub fn ground_contacts(&self) -> u32 {
        self.ground_contacts
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    /// Recent positions, oldest first (debug path drawing)
    pub fn trail(&self) -> impl Iterator<Item = &Vec3> {
        self.trail.iter()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Take queued events. Called by the owner after a tick completes.
    pub fn drain_events(&mut self) -> Vec<FlightEvent> {
        std::mem::take(&mut self.events)
    }

    /// Launch a delivery. Only valid from Idle; anything else is ignored and
    /// returns false.
    #[allow(clippy::too_many_arguments)]
    pub fn start_delivery(
        &mut self,
        strategy: Arc<dyn DeliveryStrategy>,
        strength: f32,
        direction: f32,
        initial_velocity: Vec3,
        acceleration: Vec3,
        start: Vec3,
        config: &DeliveryConfig,
    ) -> bool {
        if self.state != BallState::Idle {
            debug!("Ignoring start_delivery while {}", self.state.name());
            return false;
        }
        if !initial_velocity.is_finite() || !acceleration.is_finite() || !start.is_finite() {
            warn!("Refusing to launch with non-finite kinematics");
            return false;
        }

        let strength = strength.clamp(0.0, 1.0);
        let direction = direction.clamp(-1.0, 1.0);
        self.drag = strategy.initialize(config, initial_velocity, strength);
        debug!(
            "{} delivery launched: v0=({:.2}, {:.2}, {:.2}) strength={:.2} direction={:.2}",
            strategy.name(),
            initial_velocity.x,
            initial_velocity.y,
            initial_velocity.z,
            strength,
            direction
        );

        self.strategy = Some(strategy);
        self.strength = strength;
        self.direction = direction;
        self.frame = FlightFrame {
            start_position: start,
            initial_velocity,
            constant_acceleration: acceleration,
            time_alive: 0.0,
            last_frame_velocity: initial_velocity,
        };
        self.position = start;
        self.velocity = initial_velocity;
        self.rolling = false;
        self.pitch_point = None;
        self.ground_contacts = 0;
        self.finish_reason = None;
        self.missing_ground_reported = false;
        self.trail.clear();
        self.record_trail(start);
        self.set_state(BallState::MidAir);
        true
    }

    /// Advance one fixed step. Idle and Finished balls do not move.
    pub fn tick(&mut self, dt: f32, config: &DeliveryConfig, world: &dyn CollisionWorld) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        match self.state {
            BallState::MidAir => self.tick_mid_air(dt, config, world),
            BallState::Bounced => self.tick_bounced(dt, config, world),
            BallState::Idle | BallState::Finished => return,
        }
        if self.state.in_flight() {
            self.check_safety(config);
        }
    }

    /// Contact reported by the host's own collision pass.
    /// Pitch contact while MidAir bounces; wicket or boundary finishes.
    pub fn notify_collision(
        &mut self,
        category: SurfaceCategory,
        normal: Vec3,
        config: &DeliveryConfig,
    ) {
        match self.state {
            BallState::MidAir if category == SurfaceCategory::Pitch => {
                let incoming = self.frame.last_frame_velocity;
                self.bounce(incoming, normal, config);
            }
            BallState::MidAir | BallState::Bounced => {
                match FinishReason::from_category(category) {
                    Some(reason) => {
                        let position = self.position;
                        self.finish(reason, position);
                    }
                    None => debug!("Ignoring {} contact after the bounce", category.name()),
                }
            }
            BallState::Idle | BallState::Finished => {
                debug!(
                    "Ignoring {} contact while {}",
                    category.name(),
                    self.state.name()
                );
            }
        }
    }

    /// Put the ball back at `start`, Idle, with the trail cleared.
    /// The only way out of Finished.
    pub fn reset(&mut self, start: Vec3) {
        let previous = self.state;
        let events = std::mem::take(&mut self.events);
        *self = Self::new(start);
        self.events = events;
        if previous != BallState::Idle {
            self.events.push(FlightEvent::StateChanged {
                from: previous,
                to: BallState::Idle,
            });
        }
    }

    fn tick_mid_air(&mut self, dt: f32, config: &DeliveryConfig, world: &dyn CollisionWorld) {
        let current = self.position;
        let t_next = self.frame.time_alive + dt;
        let next = position_at(
            self.frame.start_position,
            self.frame.initial_velocity,
            self.frame.constant_acceleration,
            t_next,
        );
        let next_velocity = velocity_at(
            self.frame.initial_velocity,
            self.frame.constant_acceleration,
            t_next,
        );
        let radius = config.ball_radius;

        let contact = match probe_below(world, current, next, config) {
            Some(ground) => {
                let next_height = next.y - ground.point.y;
                if next_height <= radius {
                    let current_height = current.y - ground.point.y;
                    Some((crossing_fraction(current_height, next_height, radius), ground))
                } else {
                    None
                }
            }
            None => {
                self.report_missing_ground(next);
                None
            }
        };

        // Rewind to the crossing point
        let end = match contact {
            Some((fraction, ground)) => {
                let mut point = current.lerp(next, fraction);
                point.y = ground.point.y + radius;
                point
            }
            None => next,
        };

        if let Some((hit, reason)) = sweep_obstacles(world, current, end, config) {
            self.frame.time_alive = t_next;
            self.frame.last_frame_velocity = next_velocity;
            self.finish(reason, hit.point);
            return;
        }

        self.frame.last_frame_velocity = next_velocity;
        self.position = end;
        self.record_trail(end);
        match contact {
            Some((fraction, ground)) => {
                self.frame.time_alive += dt * fraction;
                self.bounce(next_velocity, ground.normal, config);
            }
            None => {
                self.frame.time_alive = t_next;
                self.velocity = next_velocity;
            }
        }
    }

    fn tick_bounced(&mut self, dt: f32, config: &DeliveryConfig, world: &dyn CollisionWorld) {
        let current = self.position;
        let radius = config.ball_radius;

        let mut velocity = self.velocity / (1.0 + self.drag * dt);
        if self.rolling {
            velocity.y = 0.0;
            velocity = apply_rolling_resistance(velocity, config.pitch_friction * config.gravity * dt);
        } else {
            velocity.y -= config.gravity * dt;
        }
        let mut next = current + velocity * dt;

        if let Some((hit, reason)) = sweep_obstacles(world, current, next, config) {
            self.frame.time_alive += dt;
            self.frame.last_frame_velocity = velocity;
            self.finish(reason, hit.point);
            return;
        }

        match probe_below(world, current, next, config) {
            Some(ground) => {
                let floor = ground.point.y + radius;
                if next.y <= floor {
                    next.y = floor;
                    if !self.rolling {
                        let rebound = (-velocity.y).max(0.0) * config.restitution;
                        if rebound >= config.settle_vertical_speed {
                            velocity.y = rebound;
                            self.ground_contacts += 1;
                        } else {
                            velocity.y = 0.0;
                            self.rolling = true;
                        }
                    }
                } else if self.rolling {
                    // Ground fell away under a rolling ball
                    self.rolling = false;
                }
            }
            None => {
                self.rolling = false;
                self.report_missing_ground(next);
            }
        }

        self.velocity = velocity;
        self.position = next;
        self.frame.time_alive += dt;
        self.frame.last_frame_velocity = velocity;
        self.record_trail(next);

        if self.rolling && horizontal(velocity).length() < config.rest_speed {
            self.finish(FinishReason::CameToRest, next);
        }
    }

    fn bounce(&mut self, incoming: Vec3, normal: Vec3, config: &DeliveryConfig) {
        let normal = normal.normalize_or(Vec3::Y);
        let into_surface = incoming.dot(normal);
        let rebound = incoming - normal * into_surface + normal * (into_surface.abs() * config.restitution);

        let outgoing = match &self.strategy {
            Some(strategy) => {
                strategy.resolve_bounce(config, rebound, normal, self.strength, self.direction)
            }
            None => rebound,
        };

        self.pitch_point = Some(self.position);
        self.ground_contacts += 1;
        self.velocity = outgoing;
        self.rolling = outgoing.y < config.settle_vertical_speed;
        if self.rolling {
            self.velocity.y = 0.0;
        }
        debug!(
            "Pitched at ({:.2}, {:.2}, {:.2}), out ({:.2}, {:.2}, {:.2})",
            self.position.x, self.position.y, self.position.z, outgoing.x, outgoing.y, outgoing.z
        );

        self.set_state(BallState::Bounced);
        self.events.push(FlightEvent::Bounced {
            position: self.position,
            incoming,
            outgoing,
        });
    }

    fn check_safety(&mut self, config: &DeliveryConfig) {
        let (min, max) = config.flight_bounds();
        let outside = self.position.cmplt(min).any() || self.position.cmpgt(max).any();
        let overtime = self.frame.time_alive > config.max_flight_time;
        if outside || overtime || !self.position.is_finite() {
            warn!(
                "Safety cutoff after {:.2}s (outside bounds: {})",
                self.frame.time_alive, outside
            );
            let position = self.position;
            self.finish(FinishReason::SafetyCutoff, position);
        }
    }

    fn finish(&mut self, reason: FinishReason, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.rolling = false;
        self.finish_reason = Some(reason);
        self.record_trail(position);
        info!(
            "Delivery finished ({}) at ({:.2}, {:.2}, {:.2}) after {:.2}s",
            reason.name(),
            position.x,
            position.y,
            position.z,
            self.frame.time_alive
        );
        self.set_state(BallState::Finished);
        self.events.push(FlightEvent::Finished { reason, position });
    }

    fn report_missing_ground(&mut self, position: Vec3) {
        if self.missing_ground_reported {
            return;
        }
        self.missing_ground_reported = true;
        warn!(
            "No ground below ({:.2}, {:.2}, {:.2}), continuing without impact",
            position.x, position.y, position.z
        );
        self.events.push(FlightEvent::MissingGround { position });
    }

    fn set_state(&mut self, to: BallState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        self.events.push(FlightEvent::StateChanged { from, to });
    }

    fn record_trail(&mut self, position: Vec3) {
        if self.trail.len() >= TRAIL_CAPACITY {
            self.trail.pop_front();
        }
        self.trail.push_back(position);
    }
}

/// Ground probe for a step from `current` to `next`. The probe starts above
/// the higher of the two so a long step never starts it under the surface.
fn probe_below(
    world: &dyn CollisionWorld,
    current: Vec3,
    next: Vec3,
    config: &DeliveryConfig,
) -> Option<SurfaceHit> {
    let descent = (current.y - next.y).max(0.0);
    let origin = next + Vec3::Y * (config.probe_lift + descent);
    world.probe_ground(origin, config.probe_distance + descent)
}

/// Secondary sweep with a reduced sphere; only terminal surfaces count
fn sweep_obstacles(
    world: &dyn CollisionWorld,
    from: Vec3,
    to: Vec3,
    config: &DeliveryConfig,
) -> Option<(SurfaceHit, FinishReason)> {
    let hit = world.sweep_sphere(from, to, config.ball_radius * config.sweep_radius_factor)?;
    FinishReason::from_category(hit.category).map(|reason| (hit, reason))
}

/// Fraction of the step at which the ball's underside reaches the ground
fn crossing_fraction(current_height: f32, next_height: f32, radius: f32) -> f32 {
    let drop = current_height - next_height;
    if drop <= CROSSING_EPSILON {
        // Already touching at the start of the step
        return 0.0;
    }
    ((current_height - radius) / drop).clamp(0.0, 1.0)
}

/// Slow the horizontal velocity by `loss`, never reversing it
fn apply_rolling_resistance(velocity: Vec3, loss: f32) -> Vec3 {
    let flat = horizontal(velocity);
    let speed = flat.length();
    if speed <= f32::EPSILON {
        return Vec3::new(0.0, velocity.y, 0.0);
    }
    let slowed = flat * ((speed - loss).max(0.0) / speed);
    Vec3::new(slowed.x, velocity.y, slowed.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{DeliveryKind, SwingDelivery};
    use crate::trajectory::solve_launch;
    use crate::world::PitchWorld;

    const RELEASE: Vec3 = Vec3::new(0.0, 2.2, 0.0);

    #[allow(clippy::too_many_arguments)]
    fn launch(
        sim: &mut FlightSimulator,
        config: &DeliveryConfig,
        kind: DeliveryKind,
        target: Vec3,
        speed: f32,
        strength: f32,
        direction: f32,
    ) -> bool {
        let strategy = kind.strategy();
        let aim = target + Vec3::Y * config.ball_radius;
        let lateral = strategy.mid_air_adjust(config, aim - RELEASE, strength, direction);
        let acceleration = config.gravity_vector() + lateral;
        let solution = solve_launch(aim - RELEASE, acceleration, speed);
        sim.start_delivery(
            strategy,
            strength,
            direction,
            solution.initial_velocity,
            acceleration,
            RELEASE,
            config,
        )
    }

    fn run_to_finish(
        sim: &mut FlightSimulator,
        config: &DeliveryConfig,
        world: &dyn CollisionWorld,
        dt: f32,
    ) -> Vec<FlightEvent> {
        let mut events = Vec::new();
        for _ in 0..10_000 {
            sim.tick(dt, config, world);
            events.extend(sim.drain_events());
            if sim.state() == BallState::Finished {
                break;
            }
        }
        events
    }

    #[test]
    fn test_start_only_from_idle() {
        let config = DeliveryConfig::default();
        let mut sim = FlightSimulator::new(RELEASE);
        let target = Vec3::new(0.0, 0.0, 14.0);
        assert!(launch(&mut sim, &config, DeliveryKind::Swing, target, 30.0, 0.5, 1.0));
        let frame = *sim.frame();
        assert!(!launch(&mut sim, &config, DeliveryKind::Spin, target, 20.0, 1.0, -1.0));
        assert_eq!(sim.state(), BallState::MidAir);
        assert_eq!(*sim.frame(), frame);
        assert_eq!(sim.strategy_name(), Some("Swing"));
    }

    #[test]
    fn test_pitches_on_solved_target() {
        let config = DeliveryConfig::default();
        let world = PitchWorld::standard();
        let mut sim = FlightSimulator::new(RELEASE);
        let target = Vec3::new(0.3, 0.0, 14.0);
        assert!(launch(&mut sim, &config, DeliveryKind::Swing, target, 30.0, 0.8, 0.5));

        for _ in 0..200 {
            sim.tick(config.fixed_timestep, &config, &world);
            if sim.state() != BallState::MidAir {
                break;
            }
        }
        let pitch = sim.pitch_point().unwrap();
        assert!((pitch.y - config.ball_radius).abs() < 1e-5);
        assert!((horizontal(pitch) - horizontal(target)).length() < 0.05);
    }

    #[test]
    fn test_long_steps_do_not_tunnel() {
        let config = DeliveryConfig::default();
        let world = PitchWorld::standard();
        let mut sim = FlightSimulator::new(RELEASE);
        let target = Vec3::new(0.0, 0.0, 12.0);
        assert!(launch(&mut sim, &config, DeliveryKind::Spin, target, 18.0, 0.0, 0.0));

        for _ in 0..50 {
            sim.tick(0.1, &config, &world);
            if sim.state() != BallState::MidAir {
                break;
            }
        }
        let pitch = sim.pitch_point().unwrap();
        assert!((pitch.y - config.ball_radius).abs() < 1e-5);
        assert!(pitch.z > 10.0 && pitch.z < 14.0);
    }

    #[test]
    fn test_no_tunneling_across_step_sizes() {
        let config = DeliveryConfig::default();
        let world = PitchWorld::standard();
        let cases = [
            (DeliveryKind::Swing, 30.0, 1.0, Vec3::new(0.4, 0.0, 15.0)),
            (DeliveryKind::Spin, 16.0, 1.0, Vec3::new(-0.2, 0.0, 11.0)),
        ];

        let mut dt = 0.0005_f32;
        while dt <= 0.1 {
            for (kind, speed, strength, target) in cases {
                let mut sim = FlightSimulator::new(RELEASE);
                assert!(launch(&mut sim, &config, kind, target, speed, strength, 1.0));
                let max_ticks = (2.0 / dt).ceil() as usize;
                for _ in 0..max_ticks {
                    sim.tick(dt, &config, &world);
                    if sim.state() != BallState::MidAir {
                        break;
                    }
                }
                let pitch = sim
                    .pitch_point()
                    .unwrap_or_else(|| panic!("{:?} never pitched at dt {}", kind, dt));
                assert!(
                    pitch.y >= config.ball_radius - 1e-4,
                    "{:?} at dt {} pitched at height {}",
                    kind,
                    dt,
                    pitch.y
                );
            }
            dt *= 1.4;
        }
    }

    #[test]
    fn test_height_equal_to_radius_is_contact() {
        let config = DeliveryConfig {
            ball_radius: 0.25,
            ..Default::default()
        };
        let world = PitchWorld::standard();

        let mut sim = FlightSimulator::new(Vec3::ZERO);
        let start = Vec3::new(0.0, 0.75, 0.0);
        let v0 = Vec3::new(0.0, -1.0, 10.0);
        assert!(sim.start_delivery(Arc::new(SwingDelivery), 0.0, 0.0, v0, Vec3::ZERO, start, &config));
        sim.tick(0.5, &config, &world);
        assert_eq!(sim.state(), BallState::Bounced);
        assert_eq!(sim.pitch_point().unwrap().y, 0.25);

        let mut sim = FlightSimulator::new(Vec3::ZERO);
        let start = Vec3::new(0.0, 0.875, 0.0);
        assert!(sim.start_delivery(Arc::new(SwingDelivery), 0.0, 0.0, v0, Vec3::ZERO, start, &config));
        sim.tick(0.5, &config, &world);
        assert_eq!(sim.state(), BallState::MidAir);
    }

    #[test]
    fn test_bounce_happens_once_and_never_returns_to_mid_air() {
        let config = DeliveryConfig::default();
        let world = PitchWorld::standard();
        let mut sim = FlightSimulator::new(RELEASE);
        let target = Vec3::new(-0.2, 0.0, 15.0);
        assert!(launch(&mut sim, &config, DeliveryKind::Swing, target, 30.0, 1.0, -1.0));

        let events = run_to_finish(&mut sim, &config, &world, config.fixed_timestep);
        assert_eq!(sim.state(), BallState::Finished);

        let bounces = events
            .iter()
            .filter(|e| matches!(e, FlightEvent::Bounced { .. }))
            .count();
        assert_eq!(bounces, 1);
        assert!(!events.iter().any(|e| matches!(
            e,
            FlightEvent::StateChanged {
                from: BallState::Bounced,
                to: BallState::MidAir
            }
        )));
        assert!(sim.finish_reason().is_some());
    }

    #[test]
    fn test_straight_delivery_hits_stumps() {
        let config = DeliveryConfig::default();
        let world = PitchWorld::standard();
        let mut sim = FlightSimulator::new(RELEASE);
        let target = Vec3::new(0.0, 0.0, 18.0);
        assert!(launch(&mut sim, &config, DeliveryKind::Swing, target, 30.0, 0.0, 0.0));

        let events = run_to_finish(&mut sim, &config, &world, config.fixed_timestep);
        assert_eq!(sim.finish_reason(), Some(FinishReason::HitWicket));
        assert_eq!(sim.velocity(), Vec3::ZERO);
        assert!(events.iter().any(|e| matches!(
            e,
            FlightEvent::Finished {
                reason: FinishReason::HitWicket,
                ..
            }
        )));
    }

    #[test]
    fn test_slow_ball_rolls_to_rest() {
        let config = DeliveryConfig::default();
        let world = PitchWorld::without_stumps();
        let mut sim = FlightSimulator::new(Vec3::ZERO);
        let start = Vec3::new(0.0, config.ball_radius, 5.0);
        assert!(sim.start_delivery(
            Arc::new(SwingDelivery),
            0.0,
            0.0,
            Vec3::new(0.0, 0.0, 0.5),
            config.gravity_vector(),
            start,
            &config,
        ));

        run_to_finish(&mut sim, &config, &world, config.fixed_timestep);
        assert_eq!(sim.finish_reason(), Some(FinishReason::CameToRest));
        let rest = sim.position();
        assert!((rest.y - config.ball_radius).abs() < 1e-5);
        assert!(rest.z > 5.0 && rest.z < 5.2);
    }

    #[test]
    fn test_missing_ground_reports_and_cuts_off() {
        let config = DeliveryConfig::default();
        let world = PitchWorld::without_ground();
        let mut sim = FlightSimulator::new(RELEASE);
        let target = Vec3::new(0.0, 0.0, 10.0);
        assert!(launch(&mut sim, &config, DeliveryKind::Spin, target, 15.0, 0.0, 0.0));

        sim.tick(config.fixed_timestep, &config, &world);
        let first = sim.drain_events();
        assert!(first
            .iter()
            .any(|e| matches!(e, FlightEvent::MissingGround { .. })));
        assert_eq!(sim.state(), BallState::MidAir);

        let events = run_to_finish(&mut sim, &config, &world, config.fixed_timestep);
        assert_eq!(sim.finish_reason(), Some(FinishReason::SafetyCutoff));
        // Reported once per delivery
        assert!(!events
            .iter()
            .any(|e| matches!(e, FlightEvent::MissingGround { .. })));
    }

    #[test]
    fn test_flight_time_cutoff() {
        let config = DeliveryConfig {
            max_flight_time: 0.1,
            ..Default::default()
        };
        let world = PitchWorld::standard();
        let mut sim = FlightSimulator::new(RELEASE);
        assert!(sim.start_delivery(
            Arc::new(SwingDelivery),
            0.0,
            0.0,
            Vec3::new(0.0, 3.0, 5.0),
            config.gravity_vector(),
            RELEASE,
            &config,
        ));
        for _ in 0..10 {
            sim.tick(config.fixed_timestep, &config, &world);
        }
        assert_eq!(sim.state(), BallState::Finished);
        assert_eq!(sim.finish_reason(), Some(FinishReason::SafetyCutoff));

        // Finished is terminal until reset
        let frozen = sim.position();
        sim.tick(config.fixed_timestep, &config, &world);
        assert_eq!(sim.position(), frozen);
    }

    #[test]
    fn test_notify_collision() {
        let config = DeliveryConfig::default();
        let mut sim = FlightSimulator::new(RELEASE);

        sim.notify_collision(SurfaceCategory::Wicket, Vec3::NEG_Z, &config);
        assert_eq!(sim.state(), BallState::Idle);

        let target = Vec3::new(0.0, 0.0, 14.0);
        assert!(launch(&mut sim, &config, DeliveryKind::Swing, target, 30.0, 0.0, 0.0));
        sim.notify_collision(SurfaceCategory::Pitch, Vec3::Y, &config);
        assert_eq!(sim.state(), BallState::Bounced);
        assert!(sim.velocity().y >= 0.0);

        // Late pitch contact after the bounce is ignored
        sim.notify_collision(SurfaceCategory::Pitch, Vec3::Y, &config);
        assert_eq!(sim.ground_contacts(), 1);

        sim.notify_collision(SurfaceCategory::Boundary, Vec3::NEG_Z, &config);
        assert_eq!(sim.finish_reason(), Some(FinishReason::HitBoundary));
    }

    #[test]
    fn test_reset_returns_to_idle_and_clears_trail() {
        let config = DeliveryConfig::default();
        let world = PitchWorld::standard();
        let mut sim = FlightSimulator::new(RELEASE);
        let target = Vec3::new(0.0, 0.0, 18.0);
        assert!(launch(&mut sim, &config, DeliveryKind::Swing, target, 30.0, 0.0, 0.0));
        run_to_finish(&mut sim, &config, &world, config.fixed_timestep);
        assert!(sim.trail_len() > 2);

        let home = Vec3::new(0.6, 2.2, 0.0);
        sim.reset(home);
        assert_eq!(sim.state(), BallState::Idle);
        assert_eq!(sim.position(), home);
        assert_eq!(sim.trail_len(), 1);
        assert_eq!(sim.finish_reason(), None);
        assert!(sim.drain_events().contains(&FlightEvent::StateChanged {
            from: BallState::Finished,
            to: BallState::Idle
        }));
        assert!(launch(&mut sim, &config, DeliveryKind::Spin, target, 20.0, 0.5, 1.0));
    }

    #[test]
    fn test_trail_is_bounded() {
        let config = DeliveryConfig {
            max_flight_time: 100.0,
            ..Default::default()
        };
        let world = PitchWorld::without_ground();
        let mut sim = FlightSimulator::new(RELEASE);
        assert!(sim.start_delivery(
            Arc::new(SwingDelivery),
            0.0,
            0.0,
            Vec3::new(0.0, 0.0, 0.01),
            Vec3::ZERO,
            RELEASE,
            &config,
        ));
        for _ in 0..(TRAIL_CAPACITY * 2) {
            sim.tick(config.fixed_timestep, &config, &world);
        }
        assert_eq!(sim.trail_len(), TRAIL_CAPACITY);
    }
}
