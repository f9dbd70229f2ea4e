//! Scenario testing system for deterministic delivery testing
//!
//! Runs scripted command sequences from TOML files against the headless
//! rig and checks the resulting events and state.

pub mod assertions;
pub mod input;
pub mod parser;
pub mod runner;

pub use assertions::{AssertionError, CapturedEvent, WorldState, check_sequence, check_state};
pub use input::{ScriptedInputs, parse_command};
pub use parser::{
    ExpectedEvent, FrameInput, StateAssertion, TestDefinition, TestExpectations, TestSetup,
    WorldKind, parse_test_file,
};
pub use runner::{TestResult, extract_world_state, run_test};

/// Default path for test scenarios
pub const SCENARIOS_DIR: &str = "tests/scenarios";

/// Fixed ticks a scenario runs when it does not say otherwise
pub const DEFAULT_SCENARIO_FRAMES: u64 = 600;
