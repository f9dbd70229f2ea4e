//! Bowling events and commands
//!
//! Inbound: `BowlingCommand`s are pushed to the `CommandQueue` and drained
//! once per fixed tick. Outbound: `BowlingEvent`s are timestamped on the
//! `EventBus` for the host (UI, logs, tests) to drain.

mod bus;
mod commands;
mod format;
mod types;

pub use bus::{BusEvent, EventBus, update_event_bus_time};
pub use commands::{BowlingCommand, CommandQueue};
pub use format::{parse_event, serialize_event};
pub use types::BowlingEvent;
