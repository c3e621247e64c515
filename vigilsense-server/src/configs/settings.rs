use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

/// Serial channel delivering sensor lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    pub port_path: String,
    pub baud_rate: u32,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

/// External capture process producing the MJPEG byte stream on stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// HTTP inference endpoint consuming JPEG frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detector {
    pub url: String,
    #[serde(default = "default_target_class")]
    pub target_class: String,
    #[serde(default = "default_detector_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notifier {
    pub bot_token: String,
    pub chat_id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_notifier_timeout")]
    pub timeout_secs: u64,
}

/// Every collaborator section is optional: a missing section disables that
/// loop and the system starts degraded instead of refusing to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub sensor: Option<Sensor>,
    pub camera: Option<Camera>,
    pub detector: Option<Detector>,
    pub notifier: Option<Notifier>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()
    }
}

fn default_poll_interval() -> u64 {
    2
}

fn default_target_class() -> String {
    "person".to_string()
}

fn default_detector_timeout() -> u64 {
    5
}

fn default_notifier_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}
