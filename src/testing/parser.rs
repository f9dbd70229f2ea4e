//! Scenario file schema
//!
//! A scenario names a scene, scripts commands on fixed ticks and lists the
//! events and observable values it expects.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::tuning::DeliveryConfig;
use crate::world::PitchWorld;

#[derive(Debug, Deserialize)]
pub struct TestDefinition {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub setup: TestSetup,
    #[serde(default)]
    pub input: Vec<FrameInput>,
    #[serde(default)]
    pub expect: TestExpectations,
}

/// Scene, seed, length and tuning for one scenario
#[derive(Debug, Default, Deserialize)]
pub struct TestSetup {
    pub seed: Option<u64>,
    #[serde(default)]
    pub world: WorldKind,
    /// Fixed ticks to run (at least up to the last input or state check)
    pub frames: Option<u64>,
    /// Overrides on top of the default tuning
    #[serde(default)]
    pub tuning: DeliveryConfig,
}

/// Which reference scene the delivery is bowled into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldKind {
    #[default]
    Standard,
    WithoutStumps,
    WithoutGround,
}

impl WorldKind {
    pub fn build(&self) -> PitchWorld {
        match self {
            WorldKind::Standard => PitchWorld::standard(),
            WorldKind::WithoutStumps => PitchWorld::without_stumps(),
            WorldKind::WithoutGround => PitchWorld::without_ground(),
        }
    }
}

/// Commands issued at a specific frame
#[derive(Debug, Clone, Deserialize)]
pub struct FrameInput {
    pub frame: u64,
    /// Command lines, e.g. `"target 0.2 16"` or `"bowl"`
    #[serde(default)]
    pub commands: Vec<String>,
    /// Aim vector for the marker, held until changed
    pub aim: Option<[f32; 2]>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TestExpectations {
    #[serde(default)]
    pub sequence: Vec<ExpectedEvent>,
    /// `[[expect.state]]` tables, each checked once after its frame
    #[serde(default)]
    pub state: Vec<StateAssertion>,
}

/// One entry of the ordered event expectation
#[derive(Debug, Deserialize)]
pub struct ExpectedEvent {
    pub event: String,
    /// Finish reason, new ball state, tier or delivery kind, depending on the event
    pub detail: Option<String>,
    pub frame_min: Option<u64>,
    pub frame_max: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateAssertion {
    pub after_frame: u64,
    #[serde(default)]
    pub checks: Vec<String>,
}

pub fn parse_test_file(path: &Path) -> Result<TestDefinition, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_scenario() {
        let toml = r#"
name = "Test"
[setup]
seed = 4
world = "without_stumps"
[setup.tuning]
restitution = 0.4

[[input]]
frame = 0
commands = ["target 0 16", "strength 1", "bowl"]

[[input]]
frame = 3
aim = [1.0, 0.0]

[[expect.sequence]]
event = "DeliveryFinished"
detail = "came_to_rest"

[[expect.state]]
after_frame = 10
checks = ["ball.state = mid_air"]
"#;
        let def: TestDefinition = toml::from_str(toml).unwrap();
        assert_eq!(def.setup.seed, Some(4));
        assert_eq!(def.setup.world, WorldKind::WithoutStumps);
        assert_eq!(def.setup.tuning.restitution, 0.4);
        assert_eq!(def.setup.tuning.gravity, DeliveryConfig::default().gravity);
        assert_eq!(def.input.len(), 2);
        assert_eq!(def.input[1].aim, Some([1.0, 0.0]));
        assert_eq!(def.expect.sequence[0].detail.as_deref(), Some("came_to_rest"));
    }

    #[test]
    fn test_setup_is_optional() {
        let def: TestDefinition = toml::from_str("name = \"bare\"").unwrap();
        assert_eq!(def.setup.world, WorldKind::Standard);
        assert!(def.input.is_empty());
        assert!(def.expect.sequence.is_empty());
    }
}
