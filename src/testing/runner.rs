//! Test execution engine

use crate::constants::DIRECTION_INPUT_RANGE;
use crate::simulation::DeliveryRig;

use super::DEFAULT_SCENARIO_FRAMES;
use super::assertions::{AssertionError, CapturedEvent, WorldState, check_sequence, check_state};
use super::input::ScriptedInputs;
use super::parser::TestDefinition;

/// Result of running a test
#[derive(Debug)]
pub enum TestResult {
    Pass { frames: u64 },
    Fail { error: AssertionError },
    Error { message: String },
}

/// Run a single test and return the result
pub fn run_test(test: &TestDefinition) -> TestResult {
    let mut scripted_inputs = match ScriptedInputs::from_inputs(&test.input) {
        Ok(inputs) => inputs,
        Err(message) => return TestResult::Error { message },
    };

    // Run through every state check and at least the requested frames
    for state in &test.expect.state {
        scripted_inputs.set_max_frame(state.after_frame);
    }
    scripted_inputs.set_max_frame(
        test.setup
            .frames
            .unwrap_or(DEFAULT_SCENARIO_FRAMES)
            .saturating_sub(1),
    );

    let problems = test.setup.tuning.validate();
    if !problems.is_empty() {
        return TestResult::Error {
            message: format!("Invalid tuning: {}", problems.join(", ")),
        };
    }

    let mut rig = DeliveryRig::with_world(
        test.setup.tuning.clone(),
        test.setup.seed.unwrap_or(0),
        test.setup.world.build(),
    );

    let mut captured_events = Vec::new();
    while scripted_inputs.should_continue() {
        let frame = scripted_inputs.current_frame;
        rig.commands(scripted_inputs.advance_frame());
        for event in rig.step() {
            captured_events.push(CapturedEvent::from_bowling_event(frame, &event));
        }

        let assertions = test.expect.state.iter().filter(|a| a.after_frame == frame);
        let mut world_state = None;
        for assertion in assertions {
            let state = world_state.get_or_insert_with(|| extract_world_state(&rig));
            if let Err(error) = check_state(assertion, state) {
                return TestResult::Fail { error };
            }
        }
    }

    if let Err(error) = check_sequence(&test.expect.sequence, &captured_events) {
        return TestResult::Fail { error };
    }

    TestResult::Pass {
        frames: scripted_inputs.current_frame,
    }
}

/// Snapshot everything a state check can refer to
pub fn extract_world_state(rig: &DeliveryRig) -> WorldState {
    let mut state = WorldState::default();

    let sim = rig.simulator();
    let position = sim.position();
    let velocity = sim.velocity();
    state.text("ball.state", sim.state().name());
    state.number("ball.x", position.x);
    state.number("ball.y", position.y);
    state.number("ball.z", position.z);
    state.number("ball.vx", velocity.x);
    state.number("ball.vy", velocity.y);
    state.number("ball.vz", velocity.z);
    state.number("ball.speed", velocity.length());
    state.number("ball.time_alive", sim.frame().time_alive);
    state.number("ball.contacts", sim.ground_contacts() as f32);
    state.flag("ball.rolling", sim.is_rolling());

    let session = rig.session();
    state.text("session.kind", session.kind().name());
    state.text("session.side", session.side().name());
    state.number("session.deliveries", session.deliveries() as f32);
    // Slider units, the same scale the `direction` command takes
    state.number(
        "session.direction",
        session.displayed_direction() * DIRECTION_INPUT_RANGE,
    );
    state.number("session.release_speed", session.release_speed());
    state.flag("session.ready", session.is_ready());
    if let Some(strength) = session.locked_strength() {
        state.number("session.strength", strength);
    }

    if let Some(outcome) = session.last_outcome() {
        state.text("outcome.reason", outcome.reason.name());
        state.number("outcome.x", outcome.position.x);
        state.number("outcome.z", outcome.position.z);
        state.number("outcome.flight_time", outcome.flight_time);
        state.number("outcome.contacts", outcome.ground_contacts as f32);
        if let Some(pitch) = outcome.pitch_point {
            state.number("outcome.pitch_x", pitch.x);
            state.number("outcome.pitch_z", pitch.z);
        }
    }

    let marker = rig.marker();
    state.number("marker.x", marker.position().x);
    state.number("marker.z", marker.position().z);
    state.flag("marker.locked", marker.is_locked());

    let gate = rig.gate();
    state.number("meter.phase", gate.phase());
    state.flag("meter.running", gate.is_running());

    let taps = match rig.taps().state() {
        crate::aim::TapState::WaitingForLock => "waiting_for_lock",
        crate::aim::TapState::Locked => "locked",
    };
    state.text("taps.state", taps);

    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(toml: &str) -> TestResult {
        let def: TestDefinition = toml::from_str(toml).unwrap();
        run_test(&def)
    }

    #[test]
    fn test_direct_delivery_passes() {
        let result = run(r#"
name = "direct"
[setup]
frames = 500

[[input]]
frame = 0
commands = ["target 0 16", "strength 1", "bowl"]

[[expect.sequence]]
event = "DeliveryStarted"
detail = "swing"

[[expect.sequence]]
event = "BallBounced"

[[expect.sequence]]
event = "DeliveryFinished"

[[expect.sequence]]
event = "BallStateChanged"
detail = "idle"

[[expect.state]]
after_frame = 0
checks = ["ball.state = mid_air", "session.deliveries = 1", "session.ready = false"]
"#);
        assert!(matches!(result, TestResult::Pass { frames: 500 }), "{:?}", result);
    }

    #[test]
    fn test_direction_reads_in_slider_units() {
        let result = run(r#"
name = "around the wicket slider"
[setup]
frames = 3

[[input]]
frame = 0
commands = ["toggle_side", "direction -40"]

[[expect.state]]
after_frame = 0
checks = ["session.direction = -40", "session.side = around"]
"#);
        assert!(matches!(result, TestResult::Pass { .. }), "{:?}", result);
    }

    #[test]
    fn test_failed_check_reports_failure() {
        let result = run(r#"
name = "wrong"
[setup]
frames = 5

[[expect.state]]
after_frame = 2
checks = ["ball.state = bounced"]
"#);
        assert!(matches!(result, TestResult::Fail { .. }));
    }

    #[test]
    fn test_bad_command_is_an_error() {
        let result = run(r#"
name = "typo"
[[input]]
frame = 0
commands = ["bwol"]
"#);
        assert!(matches!(result, TestResult::Error { .. }));
    }

    #[test]
    fn test_missing_event_fails_sequence() {
        let result = run(r#"
name = "nothing bowled"
[setup]
frames = 20

[[expect.sequence]]
event = "DeliveryStarted"
"#);
        assert!(matches!(result, TestResult::Fail { .. }));
    }
}
