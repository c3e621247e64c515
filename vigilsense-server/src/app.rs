use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use tokio::sync::{broadcast, mpsc};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::Settings;
use crate::handles::*;
use crate::services::*;

/// Wire up whatever collaborators are configured and return the router.
///
/// Missing or failing collaborators degrade the system rather than aborting
/// startup: the status surface always comes up and serves last-known-good
/// (or default) snapshots.
pub async fn create_app(settings: &Arc<Settings>) -> Router {
    let monitor = MonitorHandle::new();
    let alerts_enabled = settings.notifier.as_ref().map(|n| n.enabled).unwrap_or(false);
    let presence = PresenceHandle::new(alerts_enabled);
    let (frames_tx, _frames_rx) = broadcast::channel(STREAM_QUEUE);

    // Sensor loop.
    match &settings.sensor {
        Some(sensor) => match SerialSensorSource::open(sensor) {
            Ok(source) => {
                let service = MonitorService::new(
                    monitor.clone(),
                    Box::new(source),
                    Duration::from_secs(sensor.poll_interval_secs),
                );
                let (task, _stop) = service.spawn();
                tokio::spawn(async move {
                    // The loop logs its own ending; this only surfaces a panic.
                    if let Err(e) = task.await {
                        tracing::error!("sensor loop panicked: {e}");
                    }
                });
            }
            Err(e) => tracing::error!("sensor channel unavailable, running without it: {e}"),
        },
        None => tracing::warn!("no sensor channel configured"),
    }

    // Detection worker, fed by the frame loop below.
    let detect_tx = settings.detector.as_ref().map(|detector_settings| {
        let (detect_tx, detect_rx) = mpsc::channel(DETECT_QUEUE);
        let notifier = settings
            .notifier
            .as_ref()
            .map(|n| Arc::new(TelegramNotifier::new(n)) as Arc<dyn Notifier>);
        let notifier_timeout = settings
            .notifier
            .as_ref()
            .map(|n| n.timeout_secs)
            .unwrap_or(10);

        DetectionWorker::new(
            presence.clone(),
            Arc::new(HttpDetector::new(detector_settings)),
            notifier,
            detector_settings.target_class.clone(),
            Duration::from_secs(detector_settings.timeout_secs),
            Duration::from_secs(notifier_timeout),
            detect_rx,
        )
        .spawn();

        detect_tx
    });

    // Frame loop.
    match &settings.camera {
        Some(camera) => match CameraService::from_command(camera, frames_tx.clone(), detect_tx) {
            Ok(service) => {
                let (task, _stop) = service.spawn();
                tokio::spawn(async move {
                    // The loop logs its own ending; this only surfaces a panic.
                    if let Err(e) = task.await {
                        tracing::error!("frame loop panicked: {e}");
                    }
                });
            }
            Err(e) => tracing::error!("capture unavailable, running without video: {e}"),
        },
        None => tracing::warn!("no capture command configured"),
    }

    build_router(monitor, presence, frames_tx)
}

/// Assemble the status surface over already-built shared handles.
pub fn build_router(
    monitor: MonitorHandle,
    presence: PresenceHandle,
    frames: broadcast::Sender<Bytes>,
) -> Router {
    let monitor_routes = Router::new()
        .route("/api/sensors", get(get_sensors))
        .route("/api/status", get(get_status))
        .route("/api/logs", get(get_logs))
        .with_state(MonitorState { monitor });

    let alert_routes = Router::new()
        .route("/api/presence", get(get_presence))
        .route("/api/alerts/toggle", post(toggle_alerts))
        .with_state(AlertState { presence });

    let stream_routes = Router::new()
        .route("/stream.mjpg", get(mjpeg_stream))
        .with_state(StreamState { frames });

    Router::new()
        .merge(monitor_routes)
        .merge(alert_routes)
        .merge(stream_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
