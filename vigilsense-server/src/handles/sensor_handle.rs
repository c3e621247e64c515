use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use vigilsense_core::hazard::LogRecord;
use vigilsense_core::telemetry::SensorState;

use crate::services::MonitorHandle;

#[derive(Clone)]
pub struct MonitorState {
    pub monitor: MonitorHandle,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: String,
    pub message: String,
}

/// Current sensor snapshot, last-known-good even while the loop is failing.
pub async fn get_sensors(State(state): State<MonitorState>) -> Json<SensorState> {
    Json(state.monitor.sensors().await)
}

pub async fn get_status(State(state): State<MonitorState>) -> Json<StatusBody> {
    let verdict = state.monitor.verdict().await;

    let body = if verdict.is_hazard {
        StatusBody {
            status: "hazard".to_string(),
            message: format!("⚠️ Hazard Detected: {}", verdict.reasons.join(", ")),
        }
    } else {
        StatusBody {
            status: "normal".to_string(),
            message: "✅ All Systems Normal".to_string(),
        }
    };

    Json(body)
}

pub async fn get_logs(State(state): State<MonitorState>) -> Json<Vec<LogRecord>> {
    Json(state.monitor.log_records().await)
}
