//! Scripted input injection for tests

use bevy::prelude::*;
use std::collections::HashMap;

use super::parser::FrameInput;
use crate::events::BowlingCommand;
use crate::strategy::DeliveryKind;

/// Commands to inject, keyed by frame
#[derive(Debug, Default)]
pub struct ScriptedInputs {
    pub frames: HashMap<u64, Vec<BowlingCommand>>,
    /// Current frame number
    pub current_frame: u64,
    /// Maximum frame to run
    pub max_frame: u64,
}

impl ScriptedInputs {
    /// Create from parsed frame inputs. Fails on the first bad command line.
    pub fn from_inputs(inputs: &[FrameInput]) -> Result<Self, String> {
        let mut frames: HashMap<u64, Vec<BowlingCommand>> = HashMap::new();
        let mut max_frame = 0u64;

        for fi in inputs {
            max_frame = max_frame.max(fi.frame);
            let commands = frames.entry(fi.frame).or_default();
            if let Some([x, y]) = fi.aim {
                commands.push(BowlingCommand::MoveMarker(Vec2::new(x, y)));
            }
            for line in &fi.commands {
                let command = parse_command(line)
                    .map_err(|e| format!("frame {}: {}", fi.frame, e))?;
                commands.push(command);
            }
        }

        Ok(Self {
            frames,
            current_frame: 0,
            max_frame,
        })
    }

    /// Set max frame (for state assertions)
    pub fn set_max_frame(&mut self, frame: u64) {
        self.max_frame = self.max_frame.max(frame);
    }

    /// Commands for the current frame, then move to the next one
    pub fn advance_frame(&mut self) -> Vec<BowlingCommand> {
        let commands = self.frames.remove(&self.current_frame).unwrap_or_default();
        self.current_frame += 1;
        commands
    }

    /// Check if simulation should continue
    pub fn should_continue(&self) -> bool {
        self.current_frame <= self.max_frame
    }
}

/// Parse one command line: a verb followed by whitespace-separated arguments
pub fn parse_command(line: &str) -> Result<BowlingCommand, String> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().ok_or_else(|| "empty command".to_string())?;
    let args: Vec<f32> = parts
        .clone()
        .map(|p| p.parse::<f32>())
        .collect::<Result<_, _>>()
        .unwrap_or_default();
    let word = parts.next();

    let number = |name: &str| -> Result<f32, String> {
        match args.as_slice() {
            [value] => Ok(*value),
            _ => Err(format!("'{}' takes one number, got '{}'", name, line)),
        }
    };

    let command = match verb {
        "kind" => {
            let kind = word
                .and_then(DeliveryKind::from_str)
                .ok_or_else(|| format!("unknown delivery kind in '{}'", line))?;
            BowlingCommand::SetDeliveryType(kind)
        }
        "toggle_side" => BowlingCommand::ToggleSide,
        "strength" => BowlingCommand::SetStrengthValue(number("strength")?),
        "direction" => BowlingCommand::SetDirectionInput(number("direction")?),
        "speed" => BowlingCommand::SetReleaseSpeed(number("speed")?),
        "target" => {
            let target = match args.as_slice() {
                [x, z] => Vec3::new(*x, 0.0, *z),
                [x, y, z] => Vec3::new(*x, *y, *z),
                _ => return Err(format!("'target' takes x z or x y z, got '{}'", line)),
            };
            BowlingCommand::SetBounceTarget(target)
        }
        "move" => match args.as_slice() {
            [x, y] => BowlingCommand::MoveMarker(Vec2::new(*x, *y)),
            _ => return Err(format!("'move' takes x y, got '{}'", line)),
        },
        "lock" => BowlingCommand::Lock,
        "execute" => BowlingCommand::Execute,
        "bowl" => BowlingCommand::ExecuteBowl,
        "start_meter" => BowlingCommand::StartAccuracyGate,
        "stop_meter" => BowlingCommand::StopAccuracyGate,
        _ => return Err(format!("unknown command '{}'", verb)),
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("target 0.2 16").unwrap(),
            BowlingCommand::SetBounceTarget(Vec3::new(0.2, 0.0, 16.0))
        );
        assert_eq!(
            parse_command("kind spin").unwrap(),
            BowlingCommand::SetDeliveryType(DeliveryKind::Spin)
        );
        assert_eq!(
            parse_command("direction -40").unwrap(),
            BowlingCommand::SetDirectionInput(-40.0)
        );
        assert_eq!(parse_command("  bowl ").unwrap(), BowlingCommand::ExecuteBowl);
        assert!(parse_command("strength").is_err());
        assert!(parse_command("target 1").is_err());
        assert!(parse_command("kind leg_cutter").is_err());
        assert!(parse_command("googly").is_err());
    }

    #[test]
    fn test_frames_replay_in_order() {
        let inputs = vec![
            FrameInput {
                frame: 2,
                commands: vec!["lock".into(), "execute".into()],
                aim: Some([0.0, 1.0]),
            },
            FrameInput {
                frame: 0,
                commands: vec!["stop_meter".into()],
                aim: None,
            },
        ];
        let mut scripted = ScriptedInputs::from_inputs(&inputs).unwrap();
        assert_eq!(scripted.max_frame, 2);
        assert_eq!(scripted.advance_frame(), vec![BowlingCommand::StopAccuracyGate]);
        assert!(scripted.advance_frame().is_empty());
        assert_eq!(
            scripted.advance_frame(),
            vec![
                BowlingCommand::MoveMarker(Vec2::new(0.0, 1.0)),
                BowlingCommand::Lock,
                BowlingCommand::Execute,
            ]
        );
        assert!(!scripted.should_continue());
    }

    #[test]
    fn test_bad_command_reports_frame() {
        let inputs = vec![FrameInput {
            frame: 7,
            commands: vec!["wobble".into()],
            aim: None,
        }];
        let err = ScriptedInputs::from_inputs(&inputs).unwrap_err();
        assert!(err.contains("frame 7"));
    }
}
