use base64::{Engine, engine::general_purpose::STANDARD};
use std::{fs, path::Path};
use thiserror::Error;

mod client;
mod recorder;

pub(crate) use client::TranscriptionClient;
pub(crate) use recorder::Recorder;

#[derive(Debug, Error)]
pub(crate) enum DictationError {
    #[error("no transcription service is configured (set QUILL_TRANSCRIBE_URL)")]
    NotConfigured,

    #[error("no audio data captured")]
    EmptyClip,

    #[error("could not start the recorder: {0}")]
    Recorder(#[source] std::io::Error),

    #[error("could not read the recording: {0}")]
    Io(#[from] std::io::Error),

    #[error("transcription request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("the service returned no transcription")]
    NoResult,
}

pub(crate) struct AudioClip {
    pub(crate) bytes: Vec<u8>,
    pub(crate) mime: String,
}

impl AudioClip {
    pub(crate) fn from_file(path: &Path) -> Result<Self, DictationError> {
        let bytes = fs::read(path)?;
        Ok(Self {
            bytes,
            mime: mime_for(path).to_string(),
        })
    }

    pub(crate) fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("ogg" | "oga") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("m4a" | "mp4") => "audio/mp4",
        _ => "audio/webm",
    }
}
