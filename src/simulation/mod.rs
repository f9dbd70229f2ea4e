//! Simulation module - headless deliveries for tuning and regression
//!
//! Runs the bowling plugin without rendering, alone or in batches across
//! threads, and collects per-delivery metrics into a JSON report.

pub mod config;
pub mod metrics;
pub mod parallel;
pub mod rig;
pub mod runner;

pub use config::{SimConfig, SimMode};
pub use metrics::{DeliveryResult, DeliverySpec, DeliveryStats, SimReport};
pub use parallel::{init_parallel, run_deliveries_parallel};
pub use rig::DeliveryRig;
pub use runner::{
    build_specs, delivery_commands, resolve_tuning, run_deliveries, run_delivery, run_simulation,
};
