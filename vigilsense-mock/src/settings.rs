use std::error::Error;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

/// What the process writes to stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Feed {
    /// Sensor lines, one per interval, alternating encodings.
    Sensor { interval_millis: u64 },
    /// Synthetic JPEG frames with valid markers and a filler payload.
    Camera {
        interval_millis: u64,
        #[serde(default = "default_payload_bytes")]
        payload_bytes: usize,
    },
}

fn default_payload_bytes() -> usize {
    2048
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub feed: Feed,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let settings = toml::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/configs/default.toml"
        )))?;

        Ok(settings)
    }
}
