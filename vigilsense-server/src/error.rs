use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed sensor line; the loop logs it and moves on.
    #[error(transparent)]
    Parse(#[from] vigilsense_core::Error),
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Zero-length read from the capture process: the producer died and the
    /// current capture session is over. Restart is the supervisor's job.
    #[error("camera byte stream ended")]
    StreamEnded,
    /// The sensor channel's feeding end went away.
    #[error("sensor source disconnected")]
    SourceClosed,
    #[error("failed to start capture process: {0}")]
    Capture(String),
    #[error("detector call failed: {0}")]
    Detector(String),
    #[error("notifier call failed: {0}")]
    Notifier(String),
    /// An external call outlived its budget; treated as a failed call.
    #[error("external call timed out after {0:?}")]
    Timeout(Duration),
}
