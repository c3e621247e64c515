use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use vigilsense_core::frame::FrameDemuxer;
use vigilsense_core::presence::{count_tracked, PresenceTracker};

use crate::configs::Camera;
use crate::error::Error;
use crate::services::detector::Detector;
use crate::services::notifier::Notifier;

const READ_CHUNK: usize = 4096;

/// Frames queued toward a busy detector before new ones are dropped, so a
/// slow model never backs up frame delivery to stream consumers.
pub const DETECT_QUEUE: usize = 1;

/// Frames buffered per live stream consumer; the slowest consumer lags and
/// skips rather than stalling the loop.
pub const STREAM_QUEUE: usize = 16;

/// Shared read surface over presence tracking, plus the runtime switch for
/// outbound alerts.
#[derive(Clone)]
pub struct PresenceHandle {
    inner: Arc<PresenceShared>,
}

struct PresenceShared {
    tracker: Mutex<PresenceTracker>,
    alerts_enabled: AtomicBool,
}

impl PresenceHandle {
    pub fn new(alerts_enabled: bool) -> Self {
        Self {
            inner: Arc::new(PresenceShared {
                tracker: Mutex::new(PresenceTracker::new()),
                alerts_enabled: AtomicBool::new(alerts_enabled),
            }),
        }
    }

    pub async fn count(&self) -> usize {
        self.inner.tracker.lock().await.current_count()
    }

    pub fn alerts_enabled(&self) -> bool {
        self.inner.alerts_enabled.load(Ordering::Relaxed)
    }

    /// Flip the alert switch, returning the new value.
    pub fn toggle_alerts(&self) -> bool {
        !self.inner.alerts_enabled.fetch_xor(true, Ordering::Relaxed)
    }
}

/// The frame loop: pull chunks from the camera byte source, demultiplex into
/// frames, fan frames out to stream consumers, and hand them to the
/// detection worker.
pub struct CameraService {
    reader: Box<dyn AsyncRead + Send + Unpin>,
    frames_tx: broadcast::Sender<Bytes>,
    detect_tx: Option<mpsc::Sender<Bytes>>,
    _child: Option<Child>,
}

impl CameraService {
    /// Spawn the configured capture process and read its stdout.
    pub fn from_command(
        camera: &Camera,
        frames_tx: broadcast::Sender<Bytes>,
        detect_tx: Option<mpsc::Sender<Bytes>>,
    ) -> Result<Self, Error> {
        let mut child = Command::new(&camera.command)
            .args(&camera.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Capture(format!("{}: {e}", camera.command)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Capture("capture process has no stdout".into()))?;

        tracing::info!("capture process started: {}", camera.command);

        Ok(Self {
            reader: Box::new(stdout),
            frames_tx,
            detect_tx,
            _child: Some(child),
        })
    }

    /// Read from an arbitrary byte source instead of a spawned process.
    pub fn from_reader(
        reader: impl AsyncRead + Send + Unpin + 'static,
        frames_tx: broadcast::Sender<Bytes>,
        detect_tx: Option<mpsc::Sender<Bytes>>,
    ) -> Self {
        Self {
            reader: Box::new(reader),
            frames_tx,
            detect_tx,
            _child: None,
        }
    }

    /// Spawn the loop. Dropping the returned sender without sending detaches
    /// the loop for the life of the process; sending stops it cooperatively.
    pub fn spawn(self) -> (JoinHandle<Result<(), Error>>, oneshot::Sender<()>) {
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(stop_rx));
        (task, stop_tx)
    }

    async fn run(mut self, mut stop_rx: oneshot::Receiver<()>) -> Result<(), Error> {
        let mut demuxer = FrameDemuxer::new();
        let mut chunk = vec![0u8; READ_CHUNK];
        let mut stop_armed = true;

        loop {
            tokio::select! {
                result = &mut stop_rx, if stop_armed => {
                    if result.is_ok() {
                        tracing::info!("stopping frame loop");
                        return Ok(());
                    }
                    stop_armed = false;
                }
                read = self.reader.read(&mut chunk) => {
                    let n = match read {
                        Ok(n) => n,
                        Err(e) => {
                            tracing::error!("camera read failed, frame loop ending: {e}");
                            return Err(e.into());
                        }
                    };
                    if n == 0 {
                        // The capture process died; this capture session is
                        // over and the supervisor owns the restart.
                        tracing::error!("camera byte stream ended, frame loop ending");
                        return Err(Error::StreamEnded);
                    }

                    for frame in demuxer.push(&chunk[..n]) {
                        // No stream consumers is fine.
                        let _ = self.frames_tx.send(frame.clone());

                        if let Some(detect_tx) = &self.detect_tx {
                            if detect_tx.try_send(frame).is_err() {
                                tracing::debug!("detector busy, dropping frame");
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Consumes demultiplexed frames in stream order: detect, update the
/// presence tracker, and dispatch any alert it emits.
pub struct DetectionWorker {
    presence: PresenceHandle,
    detector: Arc<dyn Detector>,
    notifier: Option<Arc<dyn Notifier>>,
    target_class: String,
    detector_timeout: Duration,
    notifier_timeout: Duration,
    frames_rx: mpsc::Receiver<Bytes>,
}

impl DetectionWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        presence: PresenceHandle,
        detector: Arc<dyn Detector>,
        notifier: Option<Arc<dyn Notifier>>,
        target_class: String,
        detector_timeout: Duration,
        notifier_timeout: Duration,
        frames_rx: mpsc::Receiver<Bytes>,
    ) -> Self {
        Self {
            presence,
            detector,
            notifier,
            target_class,
            detector_timeout,
            notifier_timeout,
            frames_rx,
        }
    }

    /// Runs until the frame loop drops its sending end.
    pub fn spawn(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(frame) = self.frames_rx.recv().await {
                if let Err(e) = self.process_frame(&frame).await {
                    // One dropped unit of work; the loop moves on.
                    tracing::error!("frame processing failed: {e}");
                }
            }
            tracing::info!("detection worker ending, frame source closed");
        })
    }

    async fn process_frame(&self, frame: &[u8]) -> Result<(), Error> {
        let detections = timeout(self.detector_timeout, self.detector.detect(frame))
            .await
            .map_err(|_| Error::Timeout(self.detector_timeout))??;
        let count = count_tracked(&detections, &self.target_class);

        let alert = {
            let mut tracker = self.presence.inner.tracker.lock().await;
            tracker.update(count, Instant::now())
        };
        let Some(alert) = alert else {
            return Ok(());
        };

        if !self.presence.alerts_enabled() {
            tracing::debug!("alerts disabled, dropping intent: {}", alert.message());
            return Ok(());
        }
        let Some(notifier) = &self.notifier else {
            return Ok(());
        };

        timeout(self.notifier_timeout, notifier.send(&alert.message()))
            .await
            .map_err(|_| Error::Timeout(self.notifier_timeout))??;

        // Cooldown advances only after a confirmed successful dispatch.
        self.presence
            .inner
            .tracker
            .lock()
            .await
            .mark_alerted(Instant::now());
        tracing::info!("alert dispatched: {}", alert.message());

        Ok(())
    }
}
