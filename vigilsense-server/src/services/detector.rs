use async_trait::async_trait;

use vigilsense_core::presence::Detection;

use crate::configs::Detector as DetectorSettings;
use crate::error::Error;

/// Object-detection collaborator: given one JPEG frame, return the detected
/// boxes. Model and inference internals live behind this seam.
#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, frame: &[u8]) -> Result<Vec<Detection>, Error>;
}

/// Client for an HTTP inference endpoint that accepts raw JPEG bytes and
/// answers with a JSON list of `{label, confidence, bbox}` entries.
pub struct HttpDetector {
    client: reqwest::Client,
    url: String,
}

impl HttpDetector {
    pub fn new(settings: &DetectorSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: settings.url.clone(),
        }
    }
}

#[async_trait]
impl Detector for HttpDetector {
    async fn detect(&self, frame: &[u8]) -> Result<Vec<Detection>, Error> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(frame.to_vec())
            .send()
            .await
            .map_err(|e| Error::Detector(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Detector(format!(
                "endpoint returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Detector(e.to_string()))
    }
}
