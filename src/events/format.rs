//! Compact text format for bowling event logs
//!
//! Format: `T:NNNNN|CODE|data...`
//! - T:NNNNN = timestamp in milliseconds (5 digits, wraps at 99999)
//! - CODE = 2-char event type code
//! - data = pipe-separated values specific to event type
//!
//! Examples:
//! ```text
//! T:00000|AS|perfect|0.512|1.00
//! T:00020|TL|0.30,0.00,14.00
//! T:00040|DS|swing|over|0.30,0.00,14.00|1.00|0.50|30.00|1|9
//! T:00520|BB|0.30,0.04,14.00|1.20,-6.80,29.10|1.50,4.08,23.20
//! T:00700|DF|hit_wicket|0.05,0.38,20.08|0.68
//! ```

use super::types::BowlingEvent;
use crate::accuracy::AccuracyTier;
use crate::ball::{BallState, FinishReason};
use crate::strategy::DeliveryKind;
use crate::tuning::BowlingSide;

fn fmt_vec(v: (f32, f32, f32)) -> String {
    format!("{:.2},{:.2},{:.2}", v.0, v.1, v.2)
}

/// Serialize a BowlingEvent to compact text format
pub fn serialize_event(time_ms: u32, event: &BowlingEvent) -> String {
    let ts = format!("T:{:05}", time_ms % 100000);
    let code = event.type_code();

    let data = match event {
        BowlingEvent::AccuracyScored { tier, phase, value } => {
            format!("{}|{:.3}|{:.2}", tier.name(), phase, value)
        }
        BowlingEvent::TargetLocked { position } => fmt_vec(*position),
        BowlingEvent::DeliveryStarted {
            kind,
            side,
            target,
            strength,
            direction,
            speed,
            converged,
            iterations,
        } => format!(
            "{}|{}|{}|{:.2}|{:.2}|{:.2}|{}|{}",
            kind.name(),
            side.name(),
            fmt_vec(*target),
            strength,
            direction,
            speed,
            u8::from(*converged),
            iterations
        ),
        BowlingEvent::BallStateChanged { from, to } => {
            format!("{}|{}", from.name(), to.name())
        }
        BowlingEvent::BallBounced {
            position,
            incoming,
            outgoing,
        } => format!(
            "{}|{}|{}",
            fmt_vec(*position),
            fmt_vec(*incoming),
            fmt_vec(*outgoing)
        ),
        BowlingEvent::DeliveryFinished {
            reason,
            position,
            flight_time,
        } => format!("{}|{}|{:.2}", reason.name(), fmt_vec(*position), flight_time),
        BowlingEvent::Diagnostic { message } => message.clone(),
    };

    format!("{}|{}|{}", ts, code, data)
}

/// Parse a line back into timestamp and event
pub fn parse_event(line: &str) -> Option<(u32, BowlingEvent)> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 3 {
        return None;
    }

    let time_ms: u32 = parts[0].strip_prefix("T:")?.parse().ok()?;
    let code = parts[1];
    let data = &parts[2..];

    let event = match code {
        "AS" if data.len() >= 3 => BowlingEvent::AccuracyScored {
            tier: AccuracyTier::from_str(data[0])?,
            phase: data[1].parse().ok()?,
            value: data[2].parse().ok()?,
        },
        "TL" => BowlingEvent::TargetLocked {
            position: parse_vec(data[0])?,
        },
        "DS" if data.len() >= 8 => BowlingEvent::DeliveryStarted {
            kind: DeliveryKind::from_str(data[0])?,
            side: BowlingSide::from_str(data[1])?,
            target: parse_vec(data[2])?,
            strength: data[3].parse().ok()?,
            direction: data[4].parse().ok()?,
            speed: data[5].parse().ok()?,
            converged: data[6] == "1",
            iterations: data[7].parse().ok()?,
        },
        "SC" if data.len() >= 2 => BowlingEvent::BallStateChanged {
            from: BallState::from_str(data[0])?,
            to: BallState::from_str(data[1])?,
        },
        "BB" if data.len() >= 3 => BowlingEvent::BallBounced {
            position: parse_vec(data[0])?,
            incoming: parse_vec(data[1])?,
            outgoing: parse_vec(data[2])?,
        },
        "DF" if data.len() >= 3 => BowlingEvent::DeliveryFinished {
            reason: FinishReason::from_str(data[0])?,
            position: parse_vec(data[1])?,
            flight_time: data[2].parse().ok()?,
        },
        // Messages may contain the separator
        "DG" => BowlingEvent::Diagnostic {
            message: data.join("|"),
        },
        _ => return None,
    };

    Some((time_ms, event))
}

fn parse_vec(s: &str) -> Option<(f32, f32, f32)> {
    let mut parts = s.split(',');
    let x = parts.next()?.trim().parse().ok()?;
    let y = parts.next()?.trim().parse().ok()?;
    let z = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((x, y, z))
}
