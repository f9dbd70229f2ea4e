//! Headless delivery rig
//!
//! Runs the bowling plugin inside a minimal Bevy app and steps the schedules
//! by hand, so batch runs and scenario tests go through the same systems as
//! an interactive host.

use std::time::Duration;

use bevy::ecs::schedule::ExecutorKind;
use bevy::prelude::*;

use crate::accuracy::AccuracyTimingGate;
use crate::aim::{BounceMarker, TapSequence};
use crate::ball::FlightSimulator;
use crate::events::{BowlingCommand, BowlingEvent, BusEvent, CommandQueue, EventBus};
use crate::plugin::BowlingPlugin;
use crate::session::{DeliveryOutcome, DeliverySession};
use crate::tuning::DeliveryConfig;
use crate::world::{CollisionScene, CollisionWorld, PitchWorld};

/// A bowling app without a window, advanced one fixed step at a time
pub struct DeliveryRig {
    app: App,
    step: f32,
    ticks: u32,
    /// Everything drained from the bus so far
    log: Vec<BusEvent>,
}

impl DeliveryRig {
    /// Rig on the standard pitch
    pub fn new(config: DeliveryConfig, seed: u64) -> Self {
        Self::with_world(config, seed, PitchWorld::standard())
    }

    pub fn with_world(
        config: DeliveryConfig,
        seed: u64,
        world: impl CollisionWorld + 'static,
    ) -> Self {
        let step = config.fixed_timestep;
        let mut app = App::new();
        // One worker per rig, batch runs put many rigs on the rayon pool
        app.add_plugins(MinimalPlugins.set(TaskPoolPlugin {
            task_pool_options: TaskPoolOptions::with_num_threads(1),
        }));
        app.insert_resource(CollisionScene::new(world));
        app.add_plugins(BowlingPlugin {
            config: Some(config),
            seed,
        });
        app.edit_schedule(Update, |schedule| {
            schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        });
        app.edit_schedule(FixedUpdate, |schedule| {
            schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        });

        Self {
            app,
            step,
            ticks: 0,
            log: Vec::new(),
        }
    }

    /// Queue a command for the next step
    pub fn command(&mut self, command: BowlingCommand) {
        self.app
            .world_mut()
            .resource_mut::<CommandQueue>()
            .push(command);
    }

    pub fn commands(&mut self, commands: impl IntoIterator<Item = BowlingCommand>) {
        self.app
            .world_mut()
            .resource_mut::<CommandQueue>()
            .push_all(commands);
    }

    /// Advance the clock by one fixed step, run `Update` then `FixedUpdate`,
    /// and return the events the step produced.
    pub fn step(&mut self) -> Vec<BowlingEvent> {
        let world = self.app.world_mut();
        world
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(self.step));
        world.run_schedule(Update);
        world.run_schedule(FixedUpdate);
        self.ticks += 1;

        let drained = world.resource_mut::<EventBus>().drain();
        let events = drained.iter().map(|e| e.event.clone()).collect();
        self.log.extend(drained);
        events
    }

    pub fn run_ticks(&mut self, ticks: u32) -> Vec<BowlingEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(self.step());
        }
        events
    }

    /// Step until a delivery finishes or `max_ticks` elapse.
    /// Returns the recorded outcome when one finished.
    pub fn run_until_finished(&mut self, max_ticks: u32) -> Option<DeliveryOutcome> {
        for _ in 0..max_ticks {
            let finished = self
                .step()
                .iter()
                .any(|e| matches!(e, BowlingEvent::DeliveryFinished { .. }));
            if finished {
                return self.session().last_outcome().copied();
            }
        }
        None
    }

    pub fn config(&self) -> &DeliveryConfig {
        self.app.world().resource::<DeliveryConfig>()
    }

    pub fn session(&self) -> &DeliverySession {
        self.app.world().resource::<DeliverySession>()
    }

    pub fn simulator(&self) -> &FlightSimulator {
        self.app.world().resource::<FlightSimulator>()
    }

    pub fn gate(&self) -> &AccuracyTimingGate {
        self.app.world().resource::<AccuracyTimingGate>()
    }

    pub fn marker(&self) -> &BounceMarker {
        self.app.world().resource::<BounceMarker>()
    }

    pub fn taps(&self) -> &TapSequence {
        self.app.world().resource::<TapSequence>()
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn elapsed(&self) -> f32 {
        self.ticks as f32 * self.step
    }

    /// Every event drained so far, with timestamps
    pub fn event_log(&self) -> &[BusEvent] {
        &self.log
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
