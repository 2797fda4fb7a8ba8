use crate::models::{lenient_list, AppData, Subject, Task};
use serde::Deserialize;
use std::{env, path::Path, path::PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write state file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize state: {0}")]
    Json(#[from] serde_json::Error),
}

/// Every shape the state file has had: a bare subject array or an object with
/// a `subjects` array. A file that is not valid JSON or matches neither shape
/// reads as empty state. Inside a readable file, a subject, log or task that
/// fails to parse is skipped on its own and the rest loads.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPayload {
    Legacy(#[serde(deserialize_with = "lenient_list")] Vec<Subject>),
    Current {
        #[serde(deserialize_with = "lenient_list")]
        subjects: Vec<Subject>,
        #[serde(default, rename = "activeSubjectId")]
        active_subject_id: Option<String>,
        #[serde(default, deserialize_with = "lenient_list")]
        tasks: Vec<Task>,
    },
}

impl From<StoredPayload> for AppData {
    fn from(payload: StoredPayload) -> Self {
        match payload {
            StoredPayload::Legacy(subjects) => AppData {
                subjects,
                ..AppData::default()
            },
            StoredPayload::Current {
                subjects,
                active_subject_id,
                tasks,
            } => AppData {
                subjects,
                active_subject_id,
                tasks,
            },
        }
    }
}

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/state.json"))
}

pub fn parse_data(bytes: &[u8]) -> Option<AppData> {
    match serde_json::from_slice::<StoredPayload>(bytes) {
        Ok(payload) => Some(payload.into()),
        Err(err) => {
            error!("failed to parse data file: {err}");
            None
        }
    }
}

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => AppData::default(),
        Ok(bytes) => parse_data(&bytes).unwrap_or_default(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

/// Writes to a sibling temp file and renames it over the target, so a reader
/// never sees a half-written state file.
pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), StorageError> {
    let payload = serde_json::to_vec_pretty(data)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, payload).await?;
    fs::rename(&tmp_path, path).await?;
    Ok(())
}
