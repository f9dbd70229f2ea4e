//! Assertion checking for test expectations

use std::collections::BTreeMap;

use super::parser::{ExpectedEvent, StateAssertion};
use crate::events::BowlingEvent;

/// Error when an assertion fails
#[derive(Debug, Clone)]
pub struct AssertionError {
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for AssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n    Expected: {}\n    Actual: {}", self.message, self.expected, self.actual)
    }
}

/// Captured event with timing info
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub frame: u64,
    pub event_type: String,
    pub detail: Option<String>,
}

impl CapturedEvent {
    pub fn from_bowling_event(frame: u64, event: &BowlingEvent) -> Self {
        let (event_type, detail) = match event {
            BowlingEvent::AccuracyScored { tier, .. } => ("AccuracyScored", Some(tier.name())),
            BowlingEvent::TargetLocked { .. } => ("TargetLocked", None),
            BowlingEvent::DeliveryStarted { kind, .. } => ("DeliveryStarted", Some(kind.name())),
            BowlingEvent::BallStateChanged { to, .. } => ("BallStateChanged", Some(to.name())),
            BowlingEvent::BallBounced { .. } => ("BallBounced", None),
            BowlingEvent::DeliveryFinished { reason, .. } => {
                ("DeliveryFinished", Some(reason.name()))
            }
            BowlingEvent::Diagnostic { .. } => ("Diagnostic", None),
        };
        Self {
            frame,
            event_type: event_type.to_string(),
            detail: detail.map(str::to_string),
        }
    }
}

impl ExpectedEvent {
    fn matches(&self, captured: &CapturedEvent) -> bool {
        captured.event_type == self.event
            && self.detail.as_ref().is_none_or(|d| captured.detail.as_ref() == Some(d))
    }

    /// Frame window violation for an event that otherwise matched
    fn window_error(&self, index: usize, frame: u64) -> Option<AssertionError> {
        let (message, bound) = match (self.frame_min, self.frame_max) {
            (Some(min), _) if frame < min => ("early", format!("frame >= {}", min)),
            (_, Some(max)) if frame > max => ("late", format!("frame <= {}", max)),
            _ => return None,
        };
        Some(AssertionError {
            message: format!("Expected event {} '{}' arrived too {}", index + 1, self.event, message),
            expected: bound,
            actual: format!("frame {}", frame),
        })
    }
}

/// Expected events must appear in order; unrelated events in between are ignored
pub fn check_sequence(expected: &[ExpectedEvent], captured: &[CapturedEvent]) -> Result<(), AssertionError> {
    let mut cursor = 0;

    for (index, exp) in expected.iter().enumerate() {
        let remaining = &captured[cursor..];
        let Some(offset) = remaining.iter().position(|cap| exp.matches(cap)) else {
            let wanted = match &exp.detail {
                Some(detail) => format!("{}({})", exp.event, detail),
                None => exp.event.clone(),
            };
            let seen: Vec<String> = remaining
                .iter()
                .map(|e| match &e.detail {
                    Some(d) => format!("{}({})", e.event_type, d),
                    None => e.event_type.clone(),
                })
                .collect();
            return Err(AssertionError {
                message: format!("Expected event {} {} never arrived", index + 1, wanted),
                expected: wanted,
                actual: format!("{:?}", seen),
            });
        };

        if let Some(error) = exp.window_error(index, remaining[offset].frame) {
            return Err(error);
        }
        cursor += offset + 1;
    }

    Ok(())
}

/// One observable value
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Number(f32),
    Text(String),
    Flag(bool),
}

impl std::fmt::Display for StateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateValue::Number(v) => write!(f, "{:.3}", v),
            StateValue::Text(s) => write!(f, "{}", s),
            StateValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

/// World state for assertions, keyed by dotted path (`ball.z`, `session.deliveries`)
#[derive(Debug, Default)]
pub struct WorldState {
    pub values: BTreeMap<String, StateValue>,
}

impl WorldState {
    pub fn number(&mut self, path: &str, value: f32) {
        self.values.insert(path.to_string(), StateValue::Number(value));
    }

    pub fn text(&mut self, path: &str, value: &str) {
        self.values.insert(path.to_string(), StateValue::Text(value.to_string()));
    }

    pub fn flag(&mut self, path: &str, value: bool) {
        self.values.insert(path.to_string(), StateValue::Flag(value));
    }
}

/// Tolerance for `=` and `!=` on numbers
const FLOAT_TOLERANCE: f32 = 0.01;

/// Two-character operators first so `>=` is not read as `>`
const OPERATORS: [&str; 6] = [">=", "<=", "!=", "=", ">", "<"];

/// Split `path op value`
fn parse_check(check: &str) -> Option<(&str, &'static str, &str)> {
    OPERATORS.iter().find_map(|op| {
        check
            .split_once(op)
            .map(|(path, value)| (path.trim(), *op, value.trim()))
    })
}

/// Check state assertions against world state
pub fn check_state(assertion: &StateAssertion, state: &WorldState) -> Result<(), AssertionError> {
    for check in &assertion.checks {
        let (path, operator, expected_value) = parse_check(check).ok_or_else(|| AssertionError {
            message: format!("Invalid check syntax: {}", check),
            expected: "format: 'ball.state = mid_air' or 'ball.z > 10'".to_string(),
            actual: check.clone(),
        })?;

        let actual = state.values.get(path).ok_or_else(|| AssertionError {
            message: format!("Unknown state path '{}'", path),
            expected: "one of the observable paths".to_string(),
            actual: format!("available: {:?}", state.values.keys().collect::<Vec<_>>()),
        })?;

        let pass = match actual {
            StateValue::Number(value) => {
                check_float_comparison(path, *value, operator, expected_value)?
            }
            StateValue::Text(text) => {
                let expected = expected_value.trim_matches('"');
                match operator {
                    "=" => text == expected,
                    "!=" => text != expected,
                    _ => return Err(invalid_operator(path, operator)),
                }
            }
            StateValue::Flag(flag) => {
                let expected = expected_value == "true";
                match operator {
                    "=" => *flag == expected,
                    "!=" => *flag != expected,
                    _ => return Err(invalid_operator(path, operator)),
                }
            }
        };

        if !pass {
            return Err(AssertionError {
                message: format!("Check failed: {} (actual: {})", check, actual),
                expected: format!("{} {} {}", path, operator, expected_value),
                actual: actual.to_string(),
            });
        }
    }

    Ok(())
}

fn invalid_operator(path: &str, operator: &str) -> AssertionError {
    AssertionError {
        message: format!("Operator '{}' not supported for {}", operator, path),
        expected: "= or !=".to_string(),
        actual: operator.to_string(),
    }
}

/// Check float comparison with operator
fn check_float_comparison(path: &str, actual: f32, operator: &str, expected_str: &str) -> Result<bool, AssertionError> {
    let value: f32 = expected_str.trim().parse().map_err(|_| AssertionError {
        message: format!("Invalid value for {}", path),
        expected: "number".to_string(),
        actual: expected_str.to_string(),
    })?;

    Ok(match operator {
        ">=" => actual >= value,
        "<=" => actual <= value,
        ">" => actual > value,
        "<" => actual < value,
        "!=" => (actual - value).abs() >= FLOAT_TOLERANCE,
        _ => (actual - value).abs() < FLOAT_TOLERANCE,
    })
}
