//! Persistent store for the task list.
//!
//! The whole collection lives in a single JSON document of the shape
//! `{"tasks": [...]}`. Every access reads the full document and every mutation
//! rewrites it in full; nothing is cached between calls.

use crate::task::Task;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Errors raised while reading or writing the task document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The document could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The document exists but is not a valid task document.
    #[error("Malformed task document: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk representation of the store.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDocument {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Access to the persisted task document.
///
/// Implementations hand out a fresh copy of the document on every `load` and
/// replace the stored document entirely on every `save`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Reads the current document. An absent or empty document yields no tasks.
    async fn load(&self) -> Result<TaskDocument, StoreError>;

    /// Overwrites the stored document with `document`.
    async fn save(&self, document: &TaskDocument) -> Result<(), StoreError>;
}

/// Repository backed by a JSON file on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document and writes it straight back, creating the file with an
    /// empty task list when it does not exist yet.
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn init(&self) -> Result<TaskDocument, StoreError> {
        let document = self.load().await?;
        self.save(&document).await?;
        tracing::info!("Task store ready with {} tasks", document.tasks.len());
        Ok(document)
    }
}

#[async_trait]
impl TaskRepository for JsonFileRepository {
    async fn load(&self) -> Result<TaskDocument, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(TaskDocument::default()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(TaskDocument::default()),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, document: &TaskDocument) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(document)?;
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }
}
