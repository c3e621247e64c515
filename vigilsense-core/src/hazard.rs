use std::collections::VecDeque;

use serde::Serialize;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::telemetry::SensorState;

pub const TEMPERATURE_LIMIT: f64 = 50.0;
pub const GAS_LIMIT: f64 = 600.0;
pub const SOUND_LIMIT: f64 = 300.0;
pub const VIBRATION_LIMIT: f64 = 100.0;

/// Bounded history depth of the hazard log.
pub const LOG_CAPACITY: usize = 10;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub is_hazard: bool,
    pub reasons: Vec<&'static str>,
}

/// Evaluate every threshold independently, in fixed order. Multiple
/// conditions may fire at once; the verdict is hazardous iff at least one
/// did. Pure, no side effects.
pub fn classify(state: &SensorState) -> Verdict {
    let mut reasons = Vec::new();

    if state.temperature > TEMPERATURE_LIMIT {
        reasons.push("High Temp");
    }
    if state.gas > GAS_LIMIT {
        reasons.push("Gas Leak");
    }
    if state.flame == 1 {
        reasons.push("Flame");
    }
    if state.sound > SOUND_LIMIT {
        reasons.push("Loud Sound");
    }
    if state.vibration > VIBRATION_LIMIT {
        reasons.push("Vibration");
    }

    Verdict {
        is_hazard: !reasons.is_empty(),
        reasons,
    }
}

/// One recorded threshold breach, frozen at trigger time.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardEvent {
    pub timestamp: OffsetDateTime,
    pub reasons: Vec<&'static str>,
    pub state: SensorState,
}

impl HazardEvent {
    pub fn new(reasons: Vec<&'static str>, state: SensorState) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            reasons,
            state,
        }
    }

    pub fn to_record(&self) -> LogRecord {
        let timestamp = self
            .timestamp
            .format(&TIMESTAMP_FORMAT)
            .unwrap_or_else(|_| self.timestamp.to_string());

        LogRecord {
            timestamp,
            detection: self.reasons.join(", "),
            temp: self.state.temperature,
            gas: self.state.gas,
            flame: self.state.flame,
            sound: self.state.sound,
            vibration: self.state.vibration,
        }
    }
}

/// Wire shape of one log entry. Field names match the dashboard contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub detection: String,
    pub temp: f64,
    pub gas: f64,
    pub flame: u8,
    pub sound: f64,
    pub vibration: f64,
}

/// Newest-first hazard history, capped at [`LOG_CAPACITY`] entries.
#[derive(Debug, Default)]
pub struct HazardLog {
    events: VecDeque<HazardEvent>,
}

impl HazardLog {
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(LOG_CAPACITY),
        }
    }

    /// Insert at the front, evicting the oldest entry when full.
    pub fn record(&mut self, event: HazardEvent) {
        self.events.push_front(event);
        if self.events.len() > LOG_CAPACITY {
            self.events.pop_back();
        }
    }

    /// Copy out up to [`LOG_CAPACITY`] events, newest first.
    pub fn snapshot(&self) -> Vec<HazardEvent> {
        self.events.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
