//! Delivery configuration: physical constants and gameplay tuning
//!
//! Loaded once at startup from `config/delivery_tuning.json` and read-only
//! afterwards. Missing fields fall back to the defaults in `constants`.

use bevy::log::{info, warn};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::strategy::DeliveryKind;

/// Path to the delivery tuning config
pub const DELIVERY_TUNING_FILE: &str = "config/delivery_tuning.json";

/// Which side of the stumps the bowler runs in on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BowlingSide {
    #[default]
    OverTheWicket,
    AroundTheWicket,
}

impl BowlingSide {
    pub fn is_over(&self) -> bool {
        matches!(self, BowlingSide::OverTheWicket)
    }

    pub fn flipped(&self) -> Self {
        match self {
            BowlingSide::OverTheWicket => BowlingSide::AroundTheWicket,
            BowlingSide::AroundTheWicket => BowlingSide::OverTheWicket,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BowlingSide::OverTheWicket => "over",
            BowlingSide::AroundTheWicket => "around",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "over" | "over_the_wicket" => Some(BowlingSide::OverTheWicket),
            "around" | "around_the_wicket" => Some(BowlingSide::AroundTheWicket),
            _ => None,
        }
    }
}

/// Half-widths of the accuracy meter zones, measured from the centre (0.5)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterZones {
    pub perfect: f32,
    pub good: f32,
    pub okay: f32,
}

impl Default for MeterZones {
    fn default() -> Self {
        Self {
            perfect: METER_PERFECT_ZONE,
            good: METER_GOOD_ZONE,
            okay: METER_OKAY_ZONE,
        }
    }
}

/// Fixed score handed out for each meter tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterScores {
    pub perfect: f32,
    pub good: f32,
    pub okay: f32,
    pub bad: f32,
}

impl Default for MeterScores {
    fn default() -> Self {
        Self {
            perfect: METER_PERFECT_SCORE,
            good: METER_GOOD_SCORE,
            okay: METER_OKAY_SCORE,
            bad: METER_BAD_SCORE,
        }
    }
}

/// Physical constants and tuning shared by the strategies, the simulator,
/// the session and the meter.
///
/// Vectors are stored as `[f32; 3]` so the file format stays plain JSON.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub gravity: f32,
    pub air_drag: f32,
    pub pitch_friction: f32,
    pub restitution: f32,
    pub max_swing_force: f32,
    pub swing_nip_factor: f32,
    pub max_spin_turn_angle: f32,
    pub spin_drag_multiplier: f32,
    pub min_ball_speed: f32,
    pub max_ball_speed: f32,
    pub default_spin_speed: f32,
    pub ball_radius: f32,
    pub fixed_timestep: f32,
    pub probe_lift: f32,
    pub probe_distance: f32,
    pub sweep_radius_factor: f32,
    pub settle_vertical_speed: f32,
    pub rest_speed: f32,
    pub max_flight_time: f32,
    pub flight_bounds_min: [f32; 3],
    pub flight_bounds_max: [f32; 3],
    pub over_the_wicket_release: [f32; 3],
    pub around_the_wicket_release: [f32; 3],
    pub spin_release_drop: f32,
    pub target_scatter: f32,
    pub meter_oscillation_speed: f32,
    pub meter_zones: MeterZones,
    pub meter_scores: MeterScores,
    pub marker_move_speed: f32,
    pub marker_min: [f32; 3],
    pub marker_max: [f32; 3],
    pub marker_start: [f32; 3],
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            air_drag: AIR_DRAG,
            pitch_friction: PITCH_FRICTION,
            restitution: RESTITUTION,
            max_swing_force: MAX_SWING_FORCE,
            swing_nip_factor: SWING_NIP_FACTOR,
            max_spin_turn_angle: MAX_SPIN_TURN_ANGLE,
            spin_drag_multiplier: SPIN_DRAG_MULTIPLIER,
            min_ball_speed: MIN_BALL_SPEED,
            max_ball_speed: MAX_BALL_SPEED,
            default_spin_speed: DEFAULT_SPIN_SPEED,
            ball_radius: BALL_RADIUS,
            fixed_timestep: FIXED_TIMESTEP,
            probe_lift: PROBE_LIFT,
            probe_distance: PROBE_DISTANCE,
            sweep_radius_factor: SWEEP_RADIUS_FACTOR,
            settle_vertical_speed: SETTLE_VERTICAL_SPEED,
            rest_speed: REST_SPEED,
            max_flight_time: MAX_FLIGHT_TIME,
            flight_bounds_min: FLIGHT_BOUNDS_MIN.to_array(),
            flight_bounds_max: FLIGHT_BOUNDS_MAX.to_array(),
            over_the_wicket_release: OVER_THE_WICKET_RELEASE.to_array(),
            around_the_wicket_release: AROUND_THE_WICKET_RELEASE.to_array(),
            spin_release_drop: SPIN_RELEASE_DROP,
            target_scatter: TARGET_SCATTER,
            meter_oscillation_speed: METER_OSCILLATION_SPEED,
            meter_zones: MeterZones::default(),
            meter_scores: MeterScores::default(),
            marker_move_speed: MARKER_MOVE_SPEED,
            marker_min: MARKER_MIN.to_array(),
            marker_max: MARKER_MAX.to_array(),
            marker_start: MARKER_START.to_array(),
        }
    }
}

impl DeliveryConfig {
    /// Gravity as an acceleration vector
    pub fn gravity_vector(&self) -> Vec3 {
        Vec3::new(0.0, -self.gravity, 0.0)
    }

    pub fn flight_bounds(&self) -> (Vec3, Vec3) {
        (
            Vec3::from_array(self.flight_bounds_min),
            Vec3::from_array(self.flight_bounds_max),
        )
    }

    /// Where the ball sits before a delivery for the given side and style
    pub fn release_point(&self, side: BowlingSide, kind: DeliveryKind) -> Vec3 {
        let mut point = match side {
            BowlingSide::OverTheWicket => Vec3::from_array(self.over_the_wicket_release),
            BowlingSide::AroundTheWicket => Vec3::from_array(self.around_the_wicket_release),
        };
        if kind == DeliveryKind::Spin {
            point.y -= self.spin_release_drop;
        }
        point
    }

    /// Release speed for a style. Swing always uses the maximum speed.
    pub fn delivery_speed(&self, kind: DeliveryKind, requested: f32) -> f32 {
        match kind {
            DeliveryKind::Swing => self.max_ball_speed,
            DeliveryKind::Spin => requested.clamp(self.min_ball_speed, self.max_ball_speed),
        }
    }

    /// List values that are out of their meaningful range.
    /// These are configuration problems, reported but not fatal.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !(0.0..=1.0).contains(&self.pitch_friction) {
            problems.push(format!("pitch_friction {} outside 0..1", self.pitch_friction));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            problems.push(format!("restitution {} outside 0..1", self.restitution));
        }
        if self.min_ball_speed <= 0.0 || self.min_ball_speed > self.max_ball_speed {
            problems.push(format!(
                "ball speed range {}..{} is invalid",
                self.min_ball_speed, self.max_ball_speed
            ));
        }
        if self.ball_radius <= 0.0 {
            problems.push(format!("ball_radius {} must be positive", self.ball_radius));
        }
        if self.fixed_timestep <= 0.0 {
            problems.push(format!("fixed_timestep {} must be positive", self.fixed_timestep));
        }
        if self.probe_distance <= self.probe_lift {
            problems.push(format!(
                "probe_distance {} does not reach below probe_lift {}",
                self.probe_distance, self.probe_lift
            ));
        }
        if self.max_flight_time <= 0.0 {
            problems.push(format!("max_flight_time {} must be positive", self.max_flight_time));
        }
        let zones = &self.meter_zones;
        if !(zones.perfect <= zones.good && zones.good <= zones.okay && zones.okay <= 0.5) {
            problems.push(format!(
                "meter zones {}/{}/{} must ascend and stay within 0.5",
                zones.perfect, zones.good, zones.okay
            ));
        }
        problems
    }
}

pub fn load_delivery_config_from_file(path: &str) -> Result<DeliveryConfig, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
}

/// Load the global tuning file, falling back to defaults.
/// Validation problems are logged, never fatal.
pub fn load_delivery_config() -> DeliveryConfig {
    let config = match load_delivery_config_from_file(DELIVERY_TUNING_FILE) {
        Ok(config) => {
            info!("Loaded delivery tuning from {}", DELIVERY_TUNING_FILE);
            config
        }
        Err(err) => {
            warn!("{}, using defaults", err);
            DeliveryConfig::default()
        }
    };
    for problem in config.validate() {
        warn!("Delivery config problem: {}", problem);
    }
    config
}
