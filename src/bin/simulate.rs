//! Bowling Simulation Tool - headless deliveries for tuning and regression
//!
//! Bowl deliveries without rendering and collect outcome metrics.
//!
//! Usage:
//!   cargo run --bin simulate -- --help
//!   cargo run --bin simulate -- --kind spin --target 0.3,15 --strength 0.8
//!   cargo run --bin simulate -- --count 100 --seed 7 --output batch.json
//!   cargo run --bin simulate -- --sweep 3 --parallel 8

use bowling::simulation::{SimConfig, run_simulation};

fn main() {
    let config = SimConfig::from_args();
    run_simulation(config);
}
