//! Bowling - a cricket bowling physics and input-timing simulator built on Bevy
//!
//! The core solves a launch for a locked bounce target, flies the ball with a
//! pluggable swing or spin strategy, bounces it off the pitch and runs it to
//! rest. `BowlingPlugin` wires it into an app; `simulation` and `testing` run
//! it headless.

// Core modules
pub mod constants;
pub mod events;
pub mod helpers;
pub mod simulation;
pub mod testing;
pub mod tuning;

// Delivery logic modules
pub mod accuracy;
pub mod aim;
pub mod ball;
pub mod plugin;
pub mod session;
pub mod strategy;
pub mod trajectory;
pub mod world;

// Re-export commonly used types for convenience
pub use accuracy::{AccuracyScore, AccuracyTier, AccuracyTimingGate, classify_phase};
pub use aim::{BounceMarker, TapSequence, TapState};
pub use ball::{BallState, FinishReason, FlightEvent, FlightFrame, FlightSimulator};
pub use events::{
    BowlingCommand, BowlingEvent, BusEvent, CommandQueue, EventBus, parse_event, serialize_event,
};
pub use plugin::{BowlingPlugin, BowlingResources};
pub use session::{
    BowlingContext, DeliveryIntent, DeliveryOutcome, DeliverySession, LaunchReport, apply_command,
    sync_after_tick,
};
pub use strategy::{DeliveryKind, DeliveryStrategy, SpinDelivery, SwingDelivery};
pub use trajectory::{TrajectorySolution, position_at, sample_path, solve_launch, velocity_at};
pub use tuning::{BowlingSide, DELIVERY_TUNING_FILE, DeliveryConfig, load_delivery_config};
pub use world::{CollisionScene, CollisionWorld, PitchWorld, SurfaceCategory, SurfaceHit};
