//! Headless simulation runner

use bevy::prelude::Vec3;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::events::{BowlingCommand, serialize_event};
use crate::helpers::{horizontal, lateral_axis};
use crate::strategy::DeliveryKind;
use crate::tuning::{BowlingSide, DELIVERY_TUNING_FILE, DeliveryConfig, load_delivery_config_from_file};

use super::config::{SimConfig, SimMode};
use super::metrics::{DeliveryResult, DeliverySpec, SimReport};
use super::parallel::{init_parallel, run_deliveries_parallel};
use super::rig::DeliveryRig;

const SWEEP_STRENGTHS: [f32; 3] = [0.5, 0.75, 1.0];
const SWEEP_DIRECTIONS: [f32; 3] = [-100.0, 0.0, 100.0];
const SWEEP_LENGTHS: [f32; 3] = [12.0, 15.0, 18.0];

/// Commands that set up and bowl one delivery on a fresh rig
pub fn delivery_commands(spec: &DeliverySpec) -> Vec<BowlingCommand> {
    let mut commands = vec![BowlingCommand::SetDeliveryType(spec.kind)];
    if spec.side != BowlingSide::default() {
        commands.push(BowlingCommand::ToggleSide);
    }
    commands.extend([
        BowlingCommand::SetReleaseSpeed(spec.release_speed),
        BowlingCommand::SetDirectionInput(spec.direction),
        BowlingCommand::SetBounceTarget(Vec3::from_array(spec.target)),
        BowlingCommand::SetStrengthValue(spec.strength),
        BowlingCommand::ExecuteBowl,
    ]);
    commands
}

/// Bowl a single delivery and return the result
pub fn run_delivery(spec: &DeliverySpec, config: &DeliveryConfig, max_ticks: u32) -> DeliveryResult {
    let mut rig = DeliveryRig::new(config.clone(), spec.seed);
    rig.commands(delivery_commands(spec));
    let outcome = rig.run_until_finished(max_ticks);

    let events = rig
        .event_log()
        .iter()
        .map(|e| (e.time_ms, e.event.clone()))
        .collect();
    let Some(launch) = rig.session().last_launch().copied() else {
        let mut result = DeliveryResult::abandoned(*spec, rig.ticks());
        result.outcome = "rejected".to_string();
        result.events = events;
        return result;
    };

    let mut result = DeliveryResult {
        launched: true,
        release_speed: launch.speed,
        solver_converged: launch.solution.converged,
        solver_iterations: launch.solution.iterations,
        scattered_target: Some(launch.scattered_target.to_array()),
        events,
        ..DeliveryResult::abandoned(*spec, rig.ticks())
    };

    if let Some(outcome) = outcome {
        result.outcome = outcome.reason.name().to_string();
        result.final_position = Some(outcome.position.to_array());
        result.flight_time = outcome.flight_time;
        result.ground_contacts = outcome.ground_contacts;
        if let Some(pitch) = outcome.pitch_point {
            result.pitch_point = Some(pitch.to_array());
            result.pitch_error = Some(horizontal(pitch - launch.scattered_target).length());
            let across = lateral_axis(pitch - launch.release_point);
            result.lateral_deviation = horizontal(outcome.position - pitch).dot(across);
        }
    }
    result
}

/// Expand the configured mode into the list of deliveries to bowl
pub fn build_specs(config: &SimConfig, base_seed: u64) -> Vec<DeliverySpec> {
    let base = DeliverySpec {
        kind: config.kind,
        side: config.side,
        target: config.target,
        strength: config.strength,
        direction: config.direction,
        release_speed: config.release_speed,
        seed: base_seed,
    };

    match &config.mode {
        SimMode::Single => vec![base],
        SimMode::Batch { count } => (0..*count)
            .map(|i| DeliverySpec {
                seed: base_seed.wrapping_add(i as u64),
                ..base
            })
            .collect(),
        SimMode::Sweep { per_cell } => {
            let kinds = or_default(&config.kinds, &DeliveryKind::ALL);
            let strengths = or_default(&config.strengths, &SWEEP_STRENGTHS);
            let directions = or_default(&config.directions, &SWEEP_DIRECTIONS);
            let lengths = or_default(&config.lengths, &SWEEP_LENGTHS);

            let mut specs = Vec::new();
            let mut delivery_num = 0u64;
            for &kind in &kinds {
                for &strength in &strengths {
                    for &direction in &directions {
                        for &length in &lengths {
                            for _ in 0..*per_cell {
                                specs.push(DeliverySpec {
                                    kind,
                                    strength,
                                    direction,
                                    target: [config.target[0], config.target[1], length],
                                    seed: base_seed.wrapping_add(delivery_num),
                                    ..base
                                });
                                delivery_num += 1;
                            }
                        }
                    }
                }
            }
            specs
        }
    }
}

fn or_default<T: Copy>(configured: &[T], fallback: &[T]) -> Vec<T> {
    if configured.is_empty() {
        fallback.to_vec()
    } else {
        configured.to_vec()
    }
}

fn mode_name(mode: &SimMode) -> &'static str {
    match mode {
        SimMode::Single => "single",
        SimMode::Batch { .. } => "batch",
        SimMode::Sweep { .. } => "sweep",
    }
}

/// Run deliveries one after another, with progress output
pub fn run_deliveries(
    specs: &[DeliverySpec],
    config: &DeliveryConfig,
    max_ticks: u32,
    quiet: bool,
) -> Vec<DeliveryResult> {
    let mut results = Vec::with_capacity(specs.len());
    for (i, spec) in specs.iter().enumerate() {
        if !quiet && specs.len() > 1 {
            print!("\rDelivery {}/{}...", i + 1, specs.len());
            std::io::stdout().flush().ok();
        }
        results.push(run_delivery(spec, config, max_ticks));
    }
    if !quiet && specs.len() > 1 {
        println!("\rCompleted {} deliveries.", specs.len());
    }
    results
}

/// Tuning for a run plus every problem worth telling the user about.
/// An unreadable file falls back to defaults; out-of-range values are kept
/// but reported.
pub fn resolve_tuning(path: Option<&str>) -> (DeliveryConfig, Vec<String>) {
    let path = path.unwrap_or(DELIVERY_TUNING_FILE);
    let mut problems = Vec::new();
    let tuning = match load_delivery_config_from_file(path) {
        Ok(tuning) => tuning,
        Err(e) => {
            problems.push(format!("{}, using defaults", e));
            DeliveryConfig::default()
        }
    };
    problems.extend(
        tuning
            .validate()
            .into_iter()
            .map(|p| format!("Tuning problem in {}: {}", path, p)),
    );
    (tuning, problems)
}

fn load_tuning(config: &SimConfig) -> DeliveryConfig {
    let (tuning, problems) = resolve_tuning(config.tuning_file.as_deref());
    for problem in problems {
        eprintln!("Warning: {}", problem);
    }
    tuning
}

/// Write one text log per delivery
fn write_event_logs(dir: &str, results: &[DeliveryResult]) {
    if let Err(e) = fs::create_dir_all(dir) {
        eprintln!("Warning: failed to create log dir {}: {}", dir, e);
        return;
    }
    for (i, result) in results.iter().enumerate() {
        let path = Path::new(dir).join(format!(
            "delivery_{:04}_{}_{}.log",
            i,
            result.spec.kind.name(),
            result.spec.seed
        ));
        let written = File::create(&path).and_then(|mut file| {
            for (time_ms, event) in &result.events {
                writeln!(file, "{}", serialize_event(*time_ms, event))?;
            }
            Ok(())
        });
        if let Err(e) = written {
            eprintln!("Warning: failed to write {}: {}", path.display(), e);
        }
    }
}

/// Entry point for the `simulate` binary
pub fn run_simulation(config: SimConfig) -> SimReport {
    let tuning = load_tuning(&config);
    let base_seed = config.seed.unwrap_or_else(rand::random);
    let specs = build_specs(&config, base_seed);

    if !config.quiet {
        println!(
            "Running {} simulation: {} deliveries (seed: {})",
            mode_name(&config.mode),
            specs.len(),
            base_seed
        );
    }

    let results = if config.parallel > 0 && specs.len() > 1 {
        if let Err(e) = init_parallel(config.parallel) {
            eprintln!("Warning: {}", e);
        }
        run_deliveries_parallel(&specs, &tuning, config.max_ticks)
    } else {
        run_deliveries(&specs, &tuning, config.max_ticks, config.quiet)
    };

    if config.log_events {
        write_event_logs(&config.log_dir, &results);
    }

    let mut report = SimReport::new(mode_name(&config.mode), base_seed);
    for result in results {
        report.add(result);
    }
    report.finalize();

    if !config.quiet {
        if let [single] = report.deliveries.as_slice() {
            print_delivery(single);
        }
        println!("{}", report.format_table());
    }

    if let Some(output_file) = &config.output_file {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => match fs::write(output_file, json) {
                Ok(()) => println!("Results written to {}", output_file),
                Err(e) => eprintln!("Failed to write {}: {}", output_file, e),
            },
            Err(e) => eprintln!("Failed to serialize report: {}", e),
        }
    }

    report
}

fn print_delivery(result: &DeliveryResult) {
    println!(
        "{} {} at {:?}: {} after {:.2}s, {} ground contact(s)",
        result.spec.kind.name(),
        result.spec.side.name(),
        result.spec.target,
        result.outcome,
        result.flight_time,
        result.ground_contacts
    );
    if let Some(pitch) = result.pitch_point {
        println!(
            "  pitched at ({:.2}, {:.2}), error {:.3}, lateral {:.3}",
            pitch[0],
            pitch[2],
            result.pitch_error.unwrap_or(0.0),
            result.lateral_deviation
        );
    }
}
