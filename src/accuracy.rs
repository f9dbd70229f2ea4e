//! Accuracy timing gate - an oscillating meter the player stops near centre

use bevy::log::debug;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::helpers::ping_pong;
use crate::tuning::DeliveryConfig;

/// Meter band the phase landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccuracyTier {
    Perfect,
    Good,
    Okay,
    Bad,
}

impl AccuracyTier {
    pub fn name(&self) -> &'static str {
        match self {
            AccuracyTier::Perfect => "perfect",
            AccuracyTier::Good => "good",
            AccuracyTier::Okay => "okay",
            AccuracyTier::Bad => "bad",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "perfect" => Some(AccuracyTier::Perfect),
            "good" => Some(AccuracyTier::Good),
            "okay" => Some(AccuracyTier::Okay),
            "bad" => Some(AccuracyTier::Bad),
            _ => None,
        }
    }
}

/// Captured meter reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyScore {
    /// Meter phase at capture, 0..1
    pub phase: f32,
    /// |phase - 0.5|
    pub distance: f32,
    pub tier: AccuracyTier,
    /// Fixed score for the tier, used as delivery strength
    pub value: f32,
}

/// Classify a meter phase. Zone edges count toward the better tier.
pub fn classify_phase(phase: f32, config: &DeliveryConfig) -> AccuracyScore {
    let distance = (phase - 0.5).abs();
    let zones = &config.meter_zones;
    let scores = &config.meter_scores;
    let (tier, value) = if distance <= zones.perfect {
        (AccuracyTier::Perfect, scores.perfect)
    } else if distance <= zones.good {
        (AccuracyTier::Good, scores.good)
    } else if distance <= zones.okay {
        (AccuracyTier::Okay, scores.okay)
    } else {
        (AccuracyTier::Bad, scores.bad)
    };
    AccuracyScore {
        phase,
        distance,
        tier,
        value,
    }
}

/// Running meter. Starts armed.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct AccuracyTimingGate {
    elapsed: f32,
    phase: f32,
    running: bool,
}

impl Default for AccuracyTimingGate {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            phase: 0.0,
            running: true,
        }
    }
}

impl AccuracyTimingGate {
    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance the meter while running
    pub fn tick(&mut self, dt: f32, config: &DeliveryConfig) {
        if !self.running || dt <= 0.0 {
            return;
        }
        self.elapsed += dt;
        self.phase = ping_pong(self.elapsed * config.meter_oscillation_speed, 1.0);
    }

    /// Freeze the meter and score it. A second stop returns None.
    pub fn stop(&mut self, config: &DeliveryConfig) -> Option<AccuracyScore> {
        if !self.running {
            debug!("Accuracy gate already stopped");
            return None;
        }
        self.running = false;
        let score = classify_phase(self.phase, config);
        debug!(
            "Accuracy: {} (phase {:.3}, score {:.2})",
            score.tier.name(),
            score.phase,
            score.value
        );
        Some(score)
    }

    /// Zero the phase and start running again
    pub fn rearm(&mut self) {
        self.elapsed = 0.0;
        self.phase = 0.0;
        self.running = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tiers() {
        let config = DeliveryConfig::default();
        let centre = classify_phase(0.5, &config);
        assert_eq!(centre.tier, AccuracyTier::Perfect);
        assert_eq!(centre.value, 1.0);
        assert_eq!(classify_phase(0.6, &config).tier, AccuracyTier::Good);
        assert_eq!(classify_phase(0.25, &config).tier, AccuracyTier::Okay);
        assert_eq!(classify_phase(0.0, &config).tier, AccuracyTier::Bad);
        assert_eq!(classify_phase(1.0, &config).value, 0.10);
    }

    #[test]
    fn test_score_never_increases_away_from_centre() {
        let config = DeliveryConfig::default();
        let mut last = f32::INFINITY;
        for i in 0..=50 {
            let phase = 0.5 + i as f32 / 100.0;
            let value = classify_phase(phase, &config).value;
            assert!(value <= last);
            // Symmetric about the centre
            assert_eq!(value, classify_phase(1.0 - phase, &config).value);
            last = value;
        }
    }

    #[test]
    fn test_phase_oscillates_within_unit_range() {
        let config = DeliveryConfig::default();
        let mut gate = AccuracyTimingGate::default();
        let mut max_phase: f32 = 0.0;
        for _ in 0..500 {
            gate.tick(0.01, &config);
            assert!((0.0..=1.0).contains(&gate.phase()));
            max_phase = max_phase.max(gate.phase());
        }
        assert!(max_phase > 0.99);
    }

    #[test]
    fn test_stop_is_idempotent_until_rearmed() {
        let config = DeliveryConfig::default();
        let mut gate = AccuracyTimingGate::default();
        // 0.5 / 1.5 seconds reaches the centre
        for _ in 0..10 {
            gate.tick(1.0 / 30.0, &config);
        }
        let score = gate.stop(&config).unwrap();
        assert_eq!(score.tier, AccuracyTier::Perfect);
        assert!(gate.stop(&config).is_none());

        let frozen = gate.phase();
        gate.tick(0.2, &config);
        assert_eq!(gate.phase(), frozen);

        gate.rearm();
        assert!(gate.is_running());
        assert_eq!(gate.phase(), 0.0);
        assert!(gate.stop(&config).is_some());
    }
}
