use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use vigilsense_core::hazard::{classify, HazardEvent, HazardLog, LogRecord, Verdict};
use vigilsense_core::sensor;
use vigilsense_core::telemetry::SensorState;

use crate::error::Error;
use crate::services::sensor_source::SensorSource;

/// Shared read surface over the sensor pipeline state.
///
/// The sensor loop owns all writes; status handlers copy snapshots out under
/// short lock holds and never wait on the loop itself.
#[derive(Clone, Default)]
pub struct MonitorHandle {
    inner: Arc<MonitorShared>,
}

#[derive(Default)]
struct MonitorShared {
    sensors: Mutex<SensorState>,
    log: Mutex<HazardLog>,
}

impl MonitorHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one raw line, refresh the live state, and record a hazard event
    /// if any threshold fired.
    ///
    /// On a partially-malformed key/value line the fields that did parse are
    /// already applied before the error comes back, matching the per-field
    /// independence of the wire format.
    pub async fn ingest_line(&self, line: &str) -> Result<Verdict, Error> {
        let snapshot = {
            let mut sensors = self.inner.sensors.lock().await;
            let parsed = sensor::apply_line(&mut sensors, line);
            let snapshot = *sensors;
            drop(sensors);
            parsed?;
            snapshot
        };

        let verdict = classify(&snapshot);
        if verdict.is_hazard {
            tracing::info!(reasons = ?verdict.reasons, "hazard detected");
            let event = HazardEvent::new(verdict.reasons.clone(), snapshot);
            self.inner.log.lock().await.record(event);
        }

        Ok(verdict)
    }

    pub async fn sensors(&self) -> SensorState {
        *self.inner.sensors.lock().await
    }

    /// Current verdict, recomputed from the live snapshot.
    pub async fn verdict(&self) -> Verdict {
        classify(&self.sensors().await)
    }

    pub async fn log_records(&self) -> Vec<LogRecord> {
        self.inner
            .log
            .lock()
            .await
            .snapshot()
            .iter()
            .map(HazardEvent::to_record)
            .collect()
    }
}

/// The sensor loop: poll the line channel on a fixed interval and push every
/// pending line through parse → classify → log.
pub struct MonitorService {
    handle: MonitorHandle,
    source: Box<dyn SensorSource>,
    poll_interval: Duration,
}

impl MonitorService {
    pub fn new(
        handle: MonitorHandle,
        source: Box<dyn SensorSource>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            handle,
            source,
            poll_interval,
        }
    }

    /// Spawn the loop. Dropping the returned sender without sending detaches
    /// the loop for the life of the process; sending stops it cooperatively.
    pub fn spawn(mut self) -> (JoinHandle<()>, oneshot::Sender<()>) {
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.poll_interval);
            let mut stop_armed = true;

            loop {
                tokio::select! {
                    result = &mut stop_rx, if stop_armed => {
                        if result.is_ok() {
                            tracing::info!("stopping sensor loop");
                            break;
                        }
                        stop_armed = false;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = self.drain_pending().await {
                            tracing::error!("sensor source failed, sensor loop ending: {e}");
                            break;
                        }
                    }
                }
            }
        });

        (task, stop_tx)
    }

    /// Consume every line the channel has already delivered this tick. A
    /// malformed line is logged and skipped; only a dead source ends the loop.
    async fn drain_pending(&mut self) -> Result<(), Error> {
        while let Some(line) = self.source.next_line().await? {
            if let Err(e) = self.handle.ingest_line(&line).await {
                tracing::warn!("sensor line discarded: {e}");
            }
        }
        Ok(())
    }
}
