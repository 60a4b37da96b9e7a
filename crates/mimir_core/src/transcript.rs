//! Durable transcript of resolved exchanges.
//!
//! Records are `{user, bot}` pairs in arrival order, stored as one JSON
//! array. Each append rewrites the document (read-all, push, write-all);
//! volume is low and the on-disk contract is content plus order.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::MimirError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub user: String,
    pub bot: String,
}

/// Appends transcript records to a JSON file.
///
/// The file is the only mutable shared resource in the system, so appends
/// are serialized behind a mutex.
pub struct TranscriptRecorder {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TranscriptRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. Holds the writer lock across the read-modify-write.
    pub fn append(&self, user: &str, bot: &str) -> Result<(), MimirError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| MimirError::Transcript("writer lock poisoned".to_string()))?;

        let mut records = self.read_unlocked()?;
        records.push(TranscriptRecord {
            user: user.to_string(),
            bot: bot.to_string(),
        });

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(&records)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    /// All records in arrival order. A missing file is an empty transcript.
    pub fn read_all(&self) -> Result<Vec<TranscriptRecord>, MimirError> {
        self.read_unlocked()
    }

    fn read_unlocked(&self) -> Result<Vec<TranscriptRecord>, MimirError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MimirError::Io(e)),
        };
        serde_json::from_str(&raw)
            .map_err(|e| MimirError::Transcript(format!("{}: {}", self.path.display(), e)))
    }
}
