//! Trajectory module - launch solving and path sampling

mod sampler;
mod solver;

pub use sampler::*;
pub use solver::*;
