//! Parallel simulation execution
//!
//! Uses Rayon to bowl many deliveries concurrently. Each delivery runs in
//! its own headless rig with a single-threaded schedule, so rigs share
//! nothing but the read-only tuning.

use rayon::prelude::*;

use crate::tuning::DeliveryConfig;

use super::metrics::{DeliveryResult, DeliverySpec};
use super::runner::run_delivery;

/// Initialize the global Rayon pool with the given thread count.
/// Call this once at startup before running parallel simulations.
/// With `threads == 0` Rayon's default (auto-detect) is kept.
pub fn init_parallel(threads: usize) -> Result<(), String> {
    if threads == 0 {
        return Ok(());
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| format!("Failed to initialize Rayon thread pool: {}", e))
}

/// Bowl deliveries in parallel.
/// Returns results in the same order as `specs`.
pub fn run_deliveries_parallel(
    specs: &[DeliverySpec],
    config: &DeliveryConfig,
    max_ticks: u32,
) -> Vec<DeliveryResult> {
    specs
        .par_iter()
        .map(|spec| run_delivery(spec, config, max_ticks))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::{SimConfig, SimMode};
    use crate::simulation::runner::build_specs;

    #[test]
    fn test_parallel_matches_sequential() {
        let config = SimConfig {
            mode: SimMode::Batch { count: 4 },
            strength: 0.6,
            ..Default::default()
        };
        let specs = build_specs(&config, 21);
        let tuning = DeliveryConfig::default();

        let parallel = run_deliveries_parallel(&specs, &tuning, config.max_ticks);
        assert_eq!(parallel.len(), specs.len());
        for (spec, result) in specs.iter().zip(&parallel) {
            assert_eq!(result.spec, *spec);
            let sequential = run_delivery(spec, &tuning, config.max_ticks);
            assert_eq!(result.outcome, sequential.outcome);
            assert_eq!(result.scattered_target, sequential.scattered_target);
            assert_eq!(result.ticks, sequential.ticks);
        }
    }
}
