use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{AudioClip, DictationError};
use crate::config::TranscriptionSettings;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) struct TranscriptionClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl TranscriptionClient {
    pub(crate) fn from_settings(settings: &TranscriptionSettings) -> Result<Self, DictationError> {
        let endpoint = settings
            .endpoint
            .clone()
            .ok_or(DictationError::NotConfigured)?;
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint,
            api_key: settings.api_key.clone(),
        })
    }

    pub(crate) fn transcribe(&self, clip: &AudioClip) -> Result<String, DictationError> {
        if clip.bytes.is_empty() {
            return Err(DictationError::EmptyClip);
        }
        debug!(bytes = clip.bytes.len(), mime = %clip.mime, "sending audio for transcription");

        let mut request = self.http.post(&self.endpoint).json(&TranscribeRequest {
            audio_data_uri: clip.to_data_uri(),
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response: TranscribeResponse = request.send()?.error_for_status()?.json()?;

        let text = response
            .transcription
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(DictationError::NoResult)?;
        info!(chars = text.chars().count(), "transcription received");
        Ok(text)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscribeRequest {
    audio_data_uri: String,
}

#[derive(Deserialize)]
struct TranscribeResponse {
    transcription: Option<String>,
}
