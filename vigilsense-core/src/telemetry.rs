use serde::{Deserialize, Serialize};

/// Latest reading from every channel of the field sensor board.
///
/// One logical instance exists per running system. The sensor loop owns all
/// writes; everyone else gets read-only copies. Values are last-write-wins
/// and unvalidated here, out-of-range readings are the classifier's concern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Gas concentration in raw sensor units.
    pub gas: f64,
    /// Flame detected, 0 or 1.
    pub flame: u8,
    /// Sound level in raw sensor units.
    pub sound: f64,
    /// Vibration level in raw sensor units.
    pub vibration: f64,
}

impl Default for SensorState {
    fn default() -> Self {
        Self {
            temperature: 28.5,
            humidity: 46.0,
            gas: 300.0,
            flame: 0,
            sound: 150.0,
            vibration: 0.0,
        }
    }
}
