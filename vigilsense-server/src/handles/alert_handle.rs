use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::services::PresenceHandle;

#[derive(Clone)]
pub struct AlertState {
    pub presence: PresenceHandle,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresenceBody {
    pub count: usize,
    pub alerts_enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleBody {
    pub alerts_enabled: bool,
}

pub async fn get_presence(State(state): State<AlertState>) -> Json<PresenceBody> {
    Json(PresenceBody {
        count: state.presence.count().await,
        alerts_enabled: state.presence.alerts_enabled(),
    })
}

pub async fn toggle_alerts(State(state): State<AlertState>) -> Json<ToggleBody> {
    let alerts_enabled = state.presence.toggle_alerts();
    tracing::info!("alerts toggled, now {}", alerts_enabled);

    Json(ToggleBody { alerts_enabled })
}
