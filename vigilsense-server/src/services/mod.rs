pub mod camera_service;
pub mod detector;
pub mod monitor_service;
pub mod notifier;
pub mod sensor_source;

pub use camera_service::{CameraService, DetectionWorker, PresenceHandle, DETECT_QUEUE, STREAM_QUEUE};
pub use detector::{Detector, HttpDetector};
pub use monitor_service::{MonitorHandle, MonitorService};
pub use notifier::{Notifier, TelegramNotifier};
pub use sensor_source::{ChannelSensorSource, SensorSource, SerialSensorSource};
