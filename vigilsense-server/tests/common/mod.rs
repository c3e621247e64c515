use axum::Router;
use bytes::Bytes;
use tokio::sync::broadcast;

use vigilsense_server::app::build_router;
use vigilsense_server::services::{MonitorHandle, PresenceHandle, STREAM_QUEUE};

/// Router wired to bare shared handles, no loops or collaborators running.
pub struct MockApp {
    pub router: Router,
    pub monitor: MonitorHandle,
    pub presence: PresenceHandle,
    pub frames: broadcast::Sender<Bytes>,
}

impl MockApp {
    pub fn new() -> Self {
        let monitor = MonitorHandle::new();
        let presence = PresenceHandle::new(true);
        let (frames, _) = broadcast::channel(STREAM_QUEUE);
        let router = build_router(monitor.clone(), presence.clone(), frames.clone());

        Self {
            router,
            monitor,
            presence,
            frames,
        }
    }
}
