use std::convert::Infallible;

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use tokio::sync::broadcast::Sender;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

#[derive(Clone)]
pub struct StreamState {
    pub frames: Sender<Bytes>,
}

const BOUNDARY: &str = "frame";

/// Live MJPEG stream: each demultiplexed frame becomes one multipart chunk.
pub async fn mjpeg_stream(State(state): State<StreamState>) -> impl IntoResponse {
    let receiver = state.frames.subscribe();

    let stream = BroadcastStream::new(receiver).filter_map(|result| async move {
        match result {
            Ok(frame) => Some(Ok::<_, Infallible>(multipart_chunk(&frame))),
            // A lagging consumer skips frames rather than stalling the loop.
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::debug!("stream consumer lagged, skipped {skipped} frames");
                None
            }
        }
    });

    (
        [(
            header::CONTENT_TYPE,
            format!("multipart/x-mixed-replace; boundary={BOUNDARY}"),
        )],
        Body::from_stream(stream),
    )
}

fn multipart_chunk(frame: &Bytes) -> Bytes {
    let mut chunk = BytesMut::with_capacity(frame.len() + 96);
    chunk.put_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
            frame.len()
        )
        .as_bytes(),
    );
    chunk.put_slice(frame);
    chunk.put_slice(b"\r\n");
    chunk.freeze()
}
