use anyhow::{Context, Result};
use std::{env, fs, path::PathBuf};

const DEFAULT_RECORD_COMMAND: &str = "arecord -q -f cd -t wav {output}";
const DEFAULT_LOG_FILTER: &str = "info";

pub(crate) struct Settings {
    pub(crate) data_dir: PathBuf,
    pub(crate) export_dir: PathBuf,
    pub(crate) record_command: String,
    pub(crate) log_filter: String,
    pub(crate) transcription: TranscriptionSettings,
}

pub(crate) struct TranscriptionSettings {
    pub(crate) endpoint: Option<String>,
    pub(crate) api_key: Option<String>,
}

impl Settings {
    pub(crate) fn from_env() -> Result<Self> {
        let data_dir = data_dir();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("could not create {}", data_dir.display()))?;
        let export_dir = match non_empty_var("QUILL_EXPORT_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };

        Ok(Self {
            data_dir,
            export_dir,
            record_command: non_empty_var("QUILL_RECORD_CMD")
                .unwrap_or_else(|| DEFAULT_RECORD_COMMAND.to_string()),
            log_filter: non_empty_var("QUILL_LOG")
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            transcription: TranscriptionSettings {
                endpoint: non_empty_var("QUILL_TRANSCRIBE_URL"),
                api_key: non_empty_var("QUILL_TRANSCRIBE_KEY"),
            },
        })
    }

    pub(crate) fn notes_db_path(&self) -> PathBuf {
        self.data_dir.join("notes.db")
    }

    pub(crate) fn state_db_path(&self) -> PathBuf {
        self.data_dir.join("state.db")
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.data_dir.join("quill.log")
    }
}

fn data_dir() -> PathBuf {
    if let Some(dir) = non_empty_var("QUILL_HOME") {
        return PathBuf::from(dir);
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".quill")
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
