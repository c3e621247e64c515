use std::io::{BufRead, BufReader};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::configs::Sensor;
use crate::error::Error;

/// A byte-oriented line channel delivering sensor records.
///
/// `next_line` never waits for data: it returns `Ok(None)` when nothing is
/// pending, so the sensor loop's cadence stays owned by its interval timer.
#[async_trait]
pub trait SensorSource: Send {
    async fn next_line(&mut self) -> Result<Option<String>, Error>;
}

/// Serial-port source backed by a blocking reader thread.
///
/// `serialport` reads block, so a dedicated thread drains the port and
/// forwards complete lines over a channel. The thread exits when the
/// receiving service is dropped or the port errors out.
pub struct SerialSensorSource {
    rx: mpsc::UnboundedReceiver<String>,
}

impl SerialSensorSource {
    pub fn open(settings: &Sensor) -> Result<Self, Error> {
        let port = serialport::new(&settings.port_path, settings.baud_rate)
            .timeout(Duration::from_secs(1))
            .open()?;

        tracing::info!("sensor channel open on {}", settings.port_path);

        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let mut reader = BufReader::new(port);
            let mut line = String::new();
            loop {
                match reader.read_line(&mut line) {
                    Ok(0) => {
                        tracing::warn!("sensor channel reached end of stream");
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if !trimmed.is_empty() && tx.send(trimmed.to_string()).is_err() {
                            break;
                        }
                        line.clear();
                    }
                    // Quiet port; keep any partial line and try again.
                    Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                    Err(e) => {
                        tracing::error!("serial read failed: {e}");
                        break;
                    }
                }
            }
        });

        Ok(Self { rx })
    }
}

#[async_trait]
impl SensorSource for SerialSensorSource {
    async fn next_line(&mut self) -> Result<Option<String>, Error> {
        match self.rx.try_recv() {
            Ok(line) => Ok(Some(line)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Error::SourceClosed),
        }
    }
}

/// Channel-backed source for tests and simulations.
pub struct ChannelSensorSource {
    rx: mpsc::UnboundedReceiver<String>,
}

impl ChannelSensorSource {
    pub fn new() -> (mpsc::UnboundedSender<String>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

#[async_trait]
impl SensorSource for ChannelSensorSource {
    async fn next_line(&mut self) -> Result<Option<String>, Error> {
        match self.rx.try_recv() {
            Ok(line) => Ok(Some(line)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Error::SourceClosed),
        }
    }
}
