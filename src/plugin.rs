//! Bevy wiring: resources plus thin systems over the bowling core
//!
//! `Update` ticks the meter, the marker and the event bus clock.
//! `FixedUpdate` drains commands, advances the ball, then syncs the session,
//! in that order, so the session only sees a transition after its tick.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::accuracy::AccuracyTimingGate;
use crate::aim::{BounceMarker, TapSequence};
use crate::ball::FlightSimulator;
use crate::events::{CommandQueue, EventBus, update_event_bus_time};
use crate::session::{BowlingContext, DeliverySession, apply_command, sync_after_tick};
use crate::tuning::{DeliveryConfig, load_delivery_config};
use crate::world::CollisionScene;

/// Adds the bowling core to an app.
///
/// With `config: None` an already inserted `DeliveryConfig` is used, otherwise
/// the tuning file is loaded. A `CollisionScene` inserted beforehand replaces
/// the reference pitch.
#[derive(Default)]
pub struct BowlingPlugin {
    pub config: Option<DeliveryConfig>,
    /// Seed for target scatter
    pub seed: u64,
}

impl Plugin for BowlingPlugin {
    fn build(&self, app: &mut App) {
        let config = match &self.config {
            Some(config) => config.clone(),
            None => app
                .world()
                .get_resource::<DeliveryConfig>()
                .cloned()
                .unwrap_or_else(load_delivery_config),
        };
        let session = DeliverySession::new(&config, self.seed);
        let release = session.release_point(&config);

        if !app.world().contains_resource::<EventBus>() {
            app.insert_resource(EventBus::new());
        }

        app.insert_resource(Time::<Fixed>::from_seconds(config.fixed_timestep as f64))
            .insert_resource(BounceMarker::new(&config))
            .insert_resource(FlightSimulator::new(release))
            .insert_resource(session)
            .insert_resource(config)
            .init_resource::<AccuracyTimingGate>()
            .init_resource::<TapSequence>()
            .init_resource::<CommandQueue>()
            .init_resource::<CollisionScene>()
            .add_systems(
                Update,
                (update_event_bus_time, tick_accuracy_gate, tick_bounce_marker),
            )
            .add_systems(
                FixedUpdate,
                (
                    process_bowling_commands,
                    advance_ball_flight,
                    sync_delivery_session,
                )
                    .chain(),
            );
    }
}

/// Everything the command and sync systems touch
#[derive(SystemParam)]
pub struct BowlingResources<'w> {
    config: Res<'w, DeliveryConfig>,
    session: ResMut<'w, DeliverySession>,
    simulator: ResMut<'w, FlightSimulator>,
    gate: ResMut<'w, AccuracyTimingGate>,
    marker: ResMut<'w, BounceMarker>,
    taps: ResMut<'w, TapSequence>,
    bus: ResMut<'w, EventBus>,
}

impl BowlingResources<'_> {
    pub fn context(&mut self) -> BowlingContext<'_> {
        BowlingContext {
            config: &*self.config,
            session: &mut *self.session,
            simulator: &mut *self.simulator,
            gate: &mut *self.gate,
            marker: &mut *self.marker,
            taps: &mut *self.taps,
            bus: &mut *self.bus,
        }
    }
}

/// Fixed step length. Falls back to the configured step when the clock has
/// not advanced (headless schedules run by hand).
fn step_seconds(time: &Time, config: &DeliveryConfig) -> f32 {
    let dt = time.delta_secs();
    if dt > 0.0 { dt } else { config.fixed_timestep }
}

pub fn tick_accuracy_gate(
    mut gate: ResMut<AccuracyTimingGate>,
    config: Res<DeliveryConfig>,
    time: Res<Time>,
) {
    gate.tick(time.delta_secs(), &config);
}

pub fn tick_bounce_marker(
    mut marker: ResMut<BounceMarker>,
    config: Res<DeliveryConfig>,
    time: Res<Time>,
) {
    marker.tick(time.delta_secs(), &config);
}

/// Drain the command queue, once per fixed tick
pub fn process_bowling_commands(mut queue: ResMut<CommandQueue>, mut state: BowlingResources) {
    let commands = queue.drain();
    if commands.is_empty() {
        return;
    }
    let mut ctx = state.context();
    for command in commands {
        apply_command(&mut ctx, command);
    }
}

pub fn advance_ball_flight(
    mut simulator: ResMut<FlightSimulator>,
    config: Res<DeliveryConfig>,
    scene: Res<CollisionScene>,
    time: Res<Time>,
) {
    let dt = step_seconds(&time, &config);
    simulator.tick(dt, &config, scene.world());
}

pub fn sync_delivery_session(mut state: BowlingResources) {
    sync_after_tick(&mut state.context());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::BallState;
    use crate::events::{BowlingCommand, BowlingEvent};
    use crate::world::PitchWorld;

    fn headless_app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>();
        app.add_plugins(BowlingPlugin {
            config: Some(DeliveryConfig::default()),
            seed: 5,
        });
        app
    }

    fn drain_bus(app: &mut App) -> Vec<BowlingEvent> {
        app.world_mut()
            .resource_mut::<EventBus>()
            .drain()
            .into_iter()
            .map(|e| e.event)
            .collect()
    }

    #[test]
    fn test_plugin_inserts_resources() {
        let app = headless_app();
        let world = app.world();
        assert!(world.contains_resource::<DeliveryConfig>());
        assert!(world.contains_resource::<CollisionScene>());
        assert!(world.resource::<EventBus>().is_enabled());
        let sim = world.resource::<FlightSimulator>();
        assert_eq!(sim.state(), BallState::Idle);
        assert_eq!(
            sim.position(),
            Vec3::from_array(DeliveryConfig::default().over_the_wicket_release)
        );
    }

    #[test]
    fn test_commands_wait_for_fixed_tick() {
        let mut app = headless_app();
        app.world_mut()
            .resource_mut::<CommandQueue>()
            .push_all([
                BowlingCommand::SetBounceTarget(Vec3::new(0.0, 0.0, 16.0)),
                BowlingCommand::SetStrengthValue(1.0),
                BowlingCommand::ExecuteBowl,
            ]);
        assert_eq!(
            app.world().resource::<FlightSimulator>().state(),
            BallState::Idle
        );

        app.world_mut().run_schedule(FixedUpdate);
        assert!(app.world().resource::<CommandQueue>().is_empty());
        let events = drain_bus(&mut app);
        assert!(matches!(events[0], BowlingEvent::DeliveryStarted { .. }));
        assert!(events.contains(&BowlingEvent::BallStateChanged {
            from: BallState::Idle,
            to: BallState::MidAir
        }));
    }

    #[test]
    fn test_headless_delivery_runs_to_completion() {
        let mut app = headless_app();
        app.insert_resource(CollisionScene::new(PitchWorld::without_stumps()));
        app.world_mut()
            .resource_mut::<CommandQueue>()
            .push_all([
                BowlingCommand::SetDeliveryType(crate::strategy::DeliveryKind::Spin),
                BowlingCommand::SetDirectionInput(80.0),
                BowlingCommand::SetBounceTarget(Vec3::new(0.0, 0.0, 15.0)),
                BowlingCommand::SetStrengthValue(0.7),
                BowlingCommand::ExecuteBowl,
            ]);

        let mut events = Vec::new();
        for _ in 0..1000 {
            app.world_mut().run_schedule(FixedUpdate);
            events.extend(drain_bus(&mut app));
            if events
                .iter()
                .any(|e| matches!(e, BowlingEvent::DeliveryFinished { .. }))
            {
                break;
            }
        }

        assert!(events
            .iter()
            .any(|e| matches!(e, BowlingEvent::BallBounced { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, BowlingEvent::DeliveryFinished { .. })));
        let world = app.world();
        assert_eq!(world.resource::<FlightSimulator>().state(), BallState::Idle);
        assert_eq!(world.resource::<DeliverySession>().deliveries(), 1);
    }

    #[test]
    fn test_update_ticks_meter() {
        let mut app = headless_app();
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(std::time::Duration::from_millis(100));
        app.world_mut().run_schedule(Update);
        let gate = app.world().resource::<AccuracyTimingGate>();
        assert!(gate.phase() > 0.1);
        assert!(app.world().resource::<EventBus>().elapsed_ms() > 0);
    }
}
