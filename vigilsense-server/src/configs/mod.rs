mod settings;

pub use settings::{Camera, Detector, Logger, Notifier, Sensor, Server, Settings};
