//! Command handling and post-tick sync, shared by the ECS systems and the
//! headless rig so both drive the core the same way.

use bevy::log::debug;

use crate::accuracy::{AccuracyScore, AccuracyTimingGate};
use crate::aim::{BounceMarker, TapSequence};
use crate::ball::{BallState, FlightEvent, FlightSimulator};
use crate::events::{BowlingCommand, BowlingEvent, EventBus};
use crate::helpers::to_tuple;
use crate::session::{DeliveryOutcome, DeliverySession};
use crate::tuning::DeliveryConfig;

/// Mutable view over everything a command can touch
pub struct BowlingContext<'a> {
    pub config: &'a DeliveryConfig,
    pub session: &'a mut DeliverySession,
    pub simulator: &'a mut FlightSimulator,
    pub gate: &'a mut AccuracyTimingGate,
    pub marker: &'a mut BounceMarker,
    pub taps: &'a mut TapSequence,
    pub bus: &'a mut EventBus,
}

impl BowlingContext<'_> {
    /// Put an Idle ball at the release point for the current side and style
    fn reposition_idle_ball(&mut self) {
        if self.simulator.state() == BallState::Idle {
            let release = self.session.release_point(self.config);
            self.simulator.reset(release);
        }
    }

    fn capture_accuracy(&mut self) {
        if let Some(score) = self.gate.stop(self.config) {
            self.session.set_locked_strength(score.value);
            self.bus.emit(accuracy_event(&score));
        }
    }

    fn execute(&mut self) {
        let Some(report) = self.session.execute_bowl(self.simulator, self.config) else {
            return;
        };
        self.bus.emit(BowlingEvent::DeliveryStarted {
            kind: report.intent.kind,
            side: self.session.side(),
            target: to_tuple(report.scattered_target),
            strength: report.intent.strength,
            direction: report.intent.direction,
            speed: report.speed,
            converged: report.solution.converged,
            iterations: report.solution.iterations,
        });
        if !report.solution.converged {
            self.bus.emit(BowlingEvent::Diagnostic {
                message: format!(
                    "launch solve unconverged: speed {:.3} wanted {:.3}",
                    report.solution.speed(),
                    report.speed
                ),
            });
        }
    }
}

fn accuracy_event(score: &AccuracyScore) -> BowlingEvent {
    BowlingEvent::AccuracyScored {
        tier: score.tier,
        phase: score.phase,
        value: score.value,
    }
}

/// Apply one inbound command
pub fn apply_command(ctx: &mut BowlingContext, command: BowlingCommand) {
    debug!("Command: {}", command.name());
    match command {
        BowlingCommand::SetDeliveryType(kind) => {
            ctx.session.set_kind(kind);
            ctx.reposition_idle_ball();
        }
        BowlingCommand::ToggleSide => {
            ctx.session.toggle_side();
            ctx.reposition_idle_ball();
        }
        BowlingCommand::SetStrengthValue(value) => ctx.session.set_locked_strength(value),
        BowlingCommand::SetBounceTarget(target) => ctx.session.set_locked_target(target),
        BowlingCommand::SetDirectionInput(value) => ctx.session.set_direction_from_ui(value),
        BowlingCommand::SetReleaseSpeed(speed) => ctx.session.set_release_speed(speed, ctx.config),
        BowlingCommand::MoveMarker(direction) => ctx.marker.set_move_direction(direction),
        BowlingCommand::Lock => {
            if ctx.taps.press_lock() {
                ctx.capture_accuracy();
                let target = ctx.marker.lock();
                ctx.session.set_locked_target(target);
                ctx.bus.emit(BowlingEvent::TargetLocked {
                    position: to_tuple(target),
                });
            }
        }
        BowlingCommand::Execute => {
            if ctx.taps.press_execute() {
                ctx.execute();
            }
        }
        BowlingCommand::ExecuteBowl => ctx.execute(),
        BowlingCommand::StartAccuracyGate => ctx.gate.rearm(),
        BowlingCommand::StopAccuracyGate => ctx.capture_accuracy(),
    }
}

/// Forward the simulator's events to the bus and, once the delivery has
/// finished, reset everything for the next one. Runs after the flight tick.
pub fn sync_after_tick(ctx: &mut BowlingContext) {
    forward_flight_events(ctx);

    if ctx.simulator.state() != BallState::Finished {
        return;
    }
    on_delivery_finished(ctx);
    forward_flight_events(ctx);
}

/// Ball back to the release point, marker free, meter running, taps reset
pub fn on_delivery_finished(ctx: &mut BowlingContext) {
    let release = ctx.session.release_point(ctx.config);
    ctx.simulator.reset(release);
    ctx.marker.reset();
    ctx.gate.rearm();
    ctx.taps.reset();
    ctx.session.clear_locks();
}

fn forward_flight_events(ctx: &mut BowlingContext) {
    for event in ctx.simulator.drain_events() {
        let translated = match event {
            FlightEvent::StateChanged { from, to } => BowlingEvent::BallStateChanged { from, to },
            FlightEvent::Bounced {
                position,
                incoming,
                outgoing,
            } => BowlingEvent::BallBounced {
                position: to_tuple(position),
                incoming: to_tuple(incoming),
                outgoing: to_tuple(outgoing),
            },
            FlightEvent::Finished { reason, position } => {
                let flight_time = ctx.simulator.frame().time_alive;
                ctx.session.record_outcome(DeliveryOutcome {
                    reason,
                    position,
                    pitch_point: ctx.simulator.pitch_point(),
                    flight_time,
                    ground_contacts: ctx.simulator.ground_contacts(),
                });
                BowlingEvent::DeliveryFinished {
                    reason,
                    position: to_tuple(position),
                    flight_time,
                }
            }
            FlightEvent::MissingGround { position } => BowlingEvent::Diagnostic {
                message: format!(
                    "no ground below ({:.2}, {:.2}, {:.2})",
                    position.x, position.y, position.z
                ),
            },
        };
        ctx.bus.emit(translated);
    }
}

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::*;
    use crate::aim::TapState;
    use crate::ball::FinishReason;
    use crate::world::PitchWorld;

    struct Harness {
        config: DeliveryConfig,
        session: DeliverySession,
        simulator: FlightSimulator,
        gate: AccuracyTimingGate,
        marker: BounceMarker,
        taps: TapSequence,
        bus: EventBus,
    }

    impl Harness {
        fn new() -> Self {
            let config = DeliveryConfig::default();
            let session = DeliverySession::new(&config, 3);
            let simulator = FlightSimulator::new(session.release_point(&config));
            Self {
                marker: BounceMarker::new(&config),
                config,
                session,
                simulator,
                gate: AccuracyTimingGate::default(),
                taps: TapSequence::default(),
                bus: EventBus::new(),
            }
        }

        fn with_ctx(&mut self, f: impl FnOnce(&mut BowlingContext<'_>)) {
            let mut ctx = BowlingContext {
                config: &self.config,
                session: &mut self.session,
                simulator: &mut self.simulator,
                gate: &mut self.gate,
                marker: &mut self.marker,
                taps: &mut self.taps,
                bus: &mut self.bus,
            };
            f(&mut ctx);
        }

        fn command(&mut self, command: BowlingCommand) {
            self.with_ctx(|ctx| apply_command(ctx, command));
        }

        fn step(&mut self, world: &PitchWorld) {
            let dt = self.config.fixed_timestep;
            self.gate.tick(dt, &self.config);
            self.marker.tick(dt, &self.config);
            self.simulator.tick(dt, &self.config, world);
            self.with_ctx(sync_after_tick);
        }

        fn events(&mut self) -> Vec<BowlingEvent> {
            self.bus.drain().into_iter().map(|e| e.event).collect()
        }
    }

    #[test]
    fn test_two_tap_delivery_cycle() {
        let world = PitchWorld::standard();
        let mut h = Harness::new();

        // Execute before lock does nothing
        h.command(BowlingCommand::Execute);
        assert_eq!(h.simulator.state(), BallState::Idle);

        for _ in 0..17 {
            h.step(&world);
        }
        h.command(BowlingCommand::Lock);
        assert_eq!(h.taps.state(), TapState::Locked);
        assert!(h.marker.is_locked());
        assert!(!h.gate.is_running());
        let locked = h.events();
        assert!(matches!(locked[0], BowlingEvent::AccuracyScored { .. }));
        assert!(matches!(locked[1], BowlingEvent::TargetLocked { .. }));

        h.command(BowlingCommand::Execute);
        assert_eq!(h.simulator.state(), BallState::MidAir);

        let mut events = Vec::new();
        for _ in 0..1000 {
            h.step(&world);
            events.extend(h.events());
            if events
                .iter()
                .any(|e| matches!(e, BowlingEvent::DeliveryFinished { .. }))
            {
                break;
            }
        }

        assert!(matches!(events[0], BowlingEvent::DeliveryStarted { .. }));
        assert!(events.contains(&BowlingEvent::BallStateChanged {
            from: BallState::Idle,
            to: BallState::MidAir
        }));
        assert!(events
            .iter()
            .any(|e| matches!(e, BowlingEvent::BallBounced { .. })));
        assert_eq!(
            events.last(),
            Some(&BowlingEvent::BallStateChanged {
                from: BallState::Finished,
                to: BallState::Idle
            })
        );

        // Ready for the next delivery
        assert_eq!(h.simulator.state(), BallState::Idle);
        assert_eq!(h.simulator.position(), h.session.release_point(&h.config));
        assert_eq!(h.taps.state(), TapState::WaitingForLock);
        assert!(h.gate.is_running());
        assert!(!h.marker.is_locked());
        assert!(!h.session.is_ready());
        assert!(h.session.last_outcome().is_some());
    }

    #[test]
    fn test_direct_commands_bowl_at_stumps() {
        let world = PitchWorld::standard();
        let mut h = Harness::new();
        h.command(BowlingCommand::ToggleSide);
        h.command(BowlingCommand::ToggleSide);
        h.command(BowlingCommand::SetBounceTarget(Vec3::new(0.0, 0.0, 18.0)));
        h.command(BowlingCommand::SetStrengthValue(1.0));
        h.command(BowlingCommand::ExecuteBowl);
        // A second bowl while in flight is ignored
        h.command(BowlingCommand::ExecuteBowl);
        assert_eq!(h.session.deliveries(), 1);

        for _ in 0..1000 {
            h.step(&world);
            if h.session.last_outcome().is_some() {
                break;
            }
        }
        let outcome = h.session.last_outcome().unwrap();
        assert!(outcome.pitch_point.is_some());
        assert!(matches!(
            outcome.reason,
            FinishReason::HitWicket | FinishReason::HitBoundary
        ));
    }

    #[test]
    fn test_toggle_side_moves_idle_ball() {
        let mut h = Harness::new();
        let over = h.simulator.position();
        h.command(BowlingCommand::ToggleSide);
        let around = h.simulator.position();
        assert_ne!(over, around);
        assert_eq!(around, Vec3::from_array(h.config.around_the_wicket_release));

        h.command(BowlingCommand::SetDeliveryType(crate::strategy::DeliveryKind::Spin));
        assert!(h.simulator.position().y < around.y);
    }

    #[test]
    fn test_stop_gate_twice_scores_once() {
        let mut h = Harness::new();
        h.command(BowlingCommand::StopAccuracyGate);
        h.command(BowlingCommand::StopAccuracyGate);
        let scored = h
            .events()
            .iter()
            .filter(|e| matches!(e, BowlingEvent::AccuracyScored { .. }))
            .count();
        assert_eq!(scored, 1);
        assert!(h.session.locked_strength().is_some());

        h.command(BowlingCommand::StartAccuracyGate);
        assert!(h.gate.is_running());
    }
}
