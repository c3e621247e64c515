use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWriteExt, Stdout};
use tokio::time;

use crate::settings::{Feed, Settings};
use crate::simulate::{json_line, plain_line, sampled_state, synthetic_frame};

pub mod settings;
pub mod simulate;

pub async fn run(settings: &Arc<Settings>) {
    match settings.feed {
        Feed::Sensor { interval_millis } => {
            run_sensor(Duration::from_millis(interval_millis)).await;
        }
        Feed::Camera {
            interval_millis,
            payload_bytes,
        } => {
            run_camera(Duration::from_millis(interval_millis), payload_bytes).await;
        }
    }
}

async fn run_sensor(period: Duration) {
    let mut out = tokio::io::stdout();
    let mut interval = time::interval(period);
    let mut index: u64 = 0;

    loop {
        interval.tick().await;

        let state = sampled_state(&mut rand::rng());
        // Alternate encodings the way mixed firmware revisions do.
        let line = if index % 2 == 0 {
            json_line(&state)
        } else {
            plain_line(&state)
        };

        tracing::debug!("emit: {line}");
        if emit(&mut out, format!("{line}\n").as_bytes()).await.is_err() {
            tracing::info!("stdout closed, stopping");
            break;
        }
        index += 1;
    }
}

async fn run_camera(period: Duration, payload_bytes: usize) {
    let mut out = tokio::io::stdout();
    let mut interval = time::interval(period);
    let mut index: u64 = 0;

    loop {
        interval.tick().await;

        let frame = synthetic_frame(index, payload_bytes);
        if emit(&mut out, &frame).await.is_err() {
            tracing::info!("stdout closed, stopping");
            break;
        }
        index += 1;
    }
}

async fn emit(out: &mut Stdout, bytes: &[u8]) -> std::io::Result<()> {
    out.write_all(bytes).await?;
    out.flush().await
}
