//! Ball module - flight state, kinematic frame, and the flight simulator

mod components;
mod physics;

pub use components::*;
pub use physics::*;
