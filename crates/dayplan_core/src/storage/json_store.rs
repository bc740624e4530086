use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
pub const COMPLETIONS_FILE_NAME: &str = "completed_tasks.json";
pub const ARCHIVE_FILE_NAME: &str = "archived_tasks.json";
pub const NOTIFICATION_STATE_FILE_NAME: &str = "notification_state.json";
pub const SCHEDULE_FILE_NAME: &str = "schedule.json";
const STORE_DIR_ENV_VAR: &str = "DAYPLAN_STORE_DIR";

#[derive(Debug, Serialize)]
struct StoredRecordRef<'a, T> {
    schema_version: u32,
    data: &'a T,
}

#[derive(Debug, Deserialize)]
struct StoredRecord<T> {
    schema_version: u32,
    data: T,
}

pub fn store_dir() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_DIR_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("dayplan"))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join("dayplan"))
    }
}

/// Strict read: `Ok(None)` when the file does not exist.
pub fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredRecord<T> =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if stored.schema_version != SCHEMA_VERSION {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    Ok(Some(stored.data))
}

/// Self-healing read: anything unreadable becomes the empty default.
pub fn load_record<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_record(path) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "discarding unreadable record");
            T::default()
        }
    }
}

pub fn save_record<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredRecordRef {
        schema_version: SCHEMA_VERSION,
        data: value,
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}

/// A value mirrored to one JSON file, written back on every mutation.
///
/// Without a path the record lives in memory only. A failed write is logged and the
/// in-memory value stays authoritative for the rest of the session.
#[derive(Debug)]
pub struct Record<T> {
    path: Option<PathBuf>,
    value: T,
}

impl<T: Serialize + DeserializeOwned + Default> Record<T> {
    pub fn open(path: PathBuf) -> Self {
        let value = load_record(&path);
        Self {
            path: Some(path),
            value,
        }
    }

    pub fn in_memory(value: T) -> Self {
        Self { path: None, value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn update<R>(&mut self, mutate: impl FnOnce(&mut T) -> R) -> R {
        let result = mutate(&mut self.value);
        self.persist();
        result
    }

    /// Like `update`, but reports whether the write reached disk.
    pub fn update_reporting(&mut self, mutate: impl FnOnce(&mut T)) -> bool {
        mutate(&mut self.value);
        self.persist()
    }

    /// Returns whether the value reached disk.
    pub fn persist(&self) -> bool {
        let Some(path) = self.path.as_deref() else {
            return false;
        };

        match save_record(path, &self.value) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "keeping record in memory only");
                false
            }
        }
    }
}
