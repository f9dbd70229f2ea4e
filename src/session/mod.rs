//! Delivery session - ties input, meter, solver and simulator together

mod control;
mod delivery;

pub use control::*;
pub use delivery::*;
