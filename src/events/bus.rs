//! Outbound event queue
//!
//! The session pushes `BowlingEvent`s here during the fixed tick. Each one is
//! stamped with the app clock so a host draining once per frame still sees
//! when things happened.

use bevy::prelude::*;

use super::types::BowlingEvent;

/// An event with the clock reading it was emitted at
#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    /// Milliseconds since the app started
    pub time_ms: u32,
    pub event: BowlingEvent,
}

#[derive(Resource, Default)]
pub struct EventBus {
    pending: Vec<BusEvent>,
    elapsed_ms: u32,
    /// Count of everything accepted since creation, drained or not
    emitted: u64,
    enabled: bool,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    /// A bus that silently discards events (batch runs that only want outcomes)
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn update_time(&mut self, elapsed_secs: f32) {
        self.elapsed_ms = (elapsed_secs * 1000.0) as u32;
    }

    pub fn emit(&mut self, event: BowlingEvent) {
        if !self.enabled {
            return;
        }
        self.emitted += 1;
        self.pending.push(BusEvent {
            time_ms: self.elapsed_ms,
            event,
        });
    }

    pub fn emit_all(&mut self, events: impl IntoIterator<Item = BowlingEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    pub fn peek(&self) -> &[BusEvent] {
        &self.pending
    }

    /// Hand every pending event to the caller, oldest first
    pub fn drain(&mut self) -> Vec<BusEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
}

/// Keeps bus timestamps in step with `Time`
pub fn update_event_bus_time(mut bus: ResMut<EventBus>, time: Res<Time>) {
    bus.update_time(time.elapsed_secs());
}
