//! Metrics collection for delivery simulation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::events::BowlingEvent;
use crate::strategy::DeliveryKind;
use crate::tuning::BowlingSide;

/// One delivery to bowl in a batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliverySpec {
    pub kind: DeliveryKind,
    pub side: BowlingSide,
    pub target: [f32; 3],
    pub strength: f32,
    /// Direction input, -100..100
    pub direction: f32,
    pub release_speed: f32,
    pub seed: u64,
}

/// Result of a single delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub spec: DeliverySpec,
    /// Whether the session accepted the delivery at all
    pub launched: bool,
    /// Finish reason name, "abandoned" when the tick budget ran out
    pub outcome: String,
    pub release_speed: f32,
    pub solver_converged: bool,
    pub solver_iterations: u32,
    /// Target after scatter
    pub scattered_target: Option<[f32; 3]>,
    pub pitch_point: Option<[f32; 3]>,
    /// Distance between the scattered target and where the ball pitched
    pub pitch_error: Option<f32>,
    pub final_position: Option<[f32; 3]>,
    pub flight_time: f32,
    pub ground_contacts: u32,
    /// Sideways travel from the pitch point to the final position
    pub lateral_deviation: f32,
    pub ticks: u32,
    /// Logged events for this delivery
    #[serde(skip)]
    pub events: Vec<(u32, BowlingEvent)>,
}

impl DeliveryResult {
    pub fn abandoned(spec: DeliverySpec, ticks: u32) -> Self {
        Self {
            spec,
            launched: false,
            outcome: "abandoned".to_string(),
            release_speed: 0.0,
            solver_converged: false,
            solver_iterations: 0,
            scattered_target: None,
            pitch_point: None,
            pitch_error: None,
            final_position: None,
            flight_time: 0.0,
            ground_contacts: 0,
            lateral_deviation: 0.0,
            ticks,
            events: Vec::new(),
        }
    }
}

/// Aggregates over a group of deliveries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryStats {
    pub deliveries: u32,
    pub launched: u32,
    pub wickets: u32,
    pub boundaries: u32,
    pub came_to_rest: u32,
    pub cutoffs: u32,
    pub unconverged: u32,
    /// Fraction of launched deliveries that hit the stumps
    pub wicket_rate: f32,
    pub avg_pitch_error: f32,
    pub avg_flight_time: f32,
    pub avg_lateral_deviation: f32,
    #[serde(skip)]
    pitch_error_sum: f32,
    #[serde(skip)]
    pitch_error_count: u32,
    #[serde(skip)]
    flight_time_sum: f32,
    #[serde(skip)]
    lateral_sum: f32,
}

impl DeliveryStats {
    pub fn record(&mut self, result: &DeliveryResult) {
        self.deliveries += 1;
        if !result.launched {
            return;
        }
        self.launched += 1;
        match result.outcome.as_str() {
            "hit_wicket" => self.wickets += 1,
            "hit_boundary" => self.boundaries += 1,
            "came_to_rest" => self.came_to_rest += 1,
            "safety_cutoff" => self.cutoffs += 1,
            _ => {}
        }
        if !result.solver_converged {
            self.unconverged += 1;
        }
        if let Some(error) = result.pitch_error {
            self.pitch_error_sum += error;
            self.pitch_error_count += 1;
        }
        self.flight_time_sum += result.flight_time;
        self.lateral_sum += result.lateral_deviation;
    }

    /// Calculate derived statistics
    pub fn finalize(&mut self) {
        if self.launched > 0 {
            let n = self.launched as f32;
            self.wicket_rate = self.wickets as f32 / n;
            self.avg_flight_time = self.flight_time_sum / n;
            self.avg_lateral_deviation = self.lateral_sum / n;
        }
        if self.pitch_error_count > 0 {
            self.avg_pitch_error = self.pitch_error_sum / self.pitch_error_count as f32;
        }
    }
}

/// Everything a simulation run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimReport {
    pub run_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub mode: String,
    pub seed: u64,
    pub overall: DeliveryStats,
    /// Stats per delivery kind name
    pub by_kind: HashMap<String, DeliveryStats>,
    pub deliveries: Vec<DeliveryResult>,
}

impl SimReport {
    pub fn new(mode: &str, seed: u64) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            finished_at: String::new(),
            mode: mode.to_string(),
            seed,
            overall: DeliveryStats::default(),
            by_kind: HashMap::new(),
            deliveries: Vec::new(),
        }
    }

    pub fn add(&mut self, result: DeliveryResult) {
        self.overall.record(&result);
        self.by_kind
            .entry(result.spec.kind.name().to_string())
            .or_default()
            .record(&result);
        self.deliveries.push(result);
    }

    pub fn finalize(&mut self) {
        self.overall.finalize();
        for stats in self.by_kind.values_mut() {
            stats.finalize();
        }
        self.finished_at = chrono::Utc::now().to_rfc3339();
    }

    /// Format a summary table
    pub fn format_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Run {} ({}, seed {})\n",
            self.run_id, self.mode, self.seed
        ));
        out.push_str(&format!(
            "{:<8} {:>6} {:>7} {:>6} {:>6} {:>9} {:>8} {:>8}\n",
            "kind", "count", "wicket", "4/6", "rest", "pitch err", "flight", "lateral"
        ));
        let mut kinds: Vec<_> = self.by_kind.iter().collect();
        kinds.sort_by(|a, b| a.0.cmp(b.0));
        for (name, stats) in kinds.into_iter().chain([(&"all".to_string(), &self.overall)]) {
            out.push_str(&format!(
                "{:<8} {:>6} {:>6.0}% {:>6} {:>6} {:>9.3} {:>7.2}s {:>8.3}\n",
                name,
                stats.deliveries,
                stats.wicket_rate * 100.0,
                stats.boundaries,
                stats.came_to_rest,
                stats.avg_pitch_error,
                stats.avg_flight_time,
                stats.avg_lateral_deviation,
            ));
        }
        out
    }
}
