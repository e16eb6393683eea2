//! Task snapshot storage with XDG path support.
//!
//! The snapshot is stored as JSON at `~/.local/share/tv/tasks.json`.
//!
//! Both synchronous and asynchronous I/O methods are provided:
//! - `save()`, `load()` - Synchronous methods using `std::fs`
//! - `save_async()`, `load_async()` - Asynchronous methods using `tokio::fs`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;

use crate::TaskSnapshot;

/// Default snapshot filename.
const STORE_FILENAME: &str = "tasks.json";

/// Application qualifier (for XDG paths).
const QUALIFIER: &str = "";

/// Application organization (for XDG paths).
const ORGANIZATION: &str = "";

/// Application name (for XDG paths).
const APPLICATION: &str = "tv";

/// Errors that can occur during snapshot storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to determine the XDG data directory.
    #[error("failed to determine data directory: no valid home directory found")]
    NoDataDir,

    /// I/O error during file read.
    #[error("failed to read task file '{path}': {source}")]
    ReadError {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during file write.
    #[error("failed to write task file '{path}': {source}")]
    WriteError {
        /// The path that failed to write.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during directory creation.
    #[error("failed to create data directory '{path}': {source}")]
    CreateDirError {
        /// The directory path that failed to create.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during file delete.
    #[error("failed to delete task file '{path}': {source}")]
    DeleteError {
        /// The path that failed to delete.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true if the error is a read of a file that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::ReadError { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistent storage for the task snapshot.
///
/// Writes are atomic (temp file + rename) but not coordinated between
/// processes; the last writer wins.
///
/// # Example
///
/// ```no_run
/// use taskview_core::{TaskSnapshot, TaskStore};
///
/// let store = TaskStore::new()?;
/// let mut snapshot = store.load_or_default()?;
/// snapshot.touch();
/// store.save(&snapshot)?;
/// # Ok::<(), taskview_core::StoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    /// Creates a store at the default XDG data path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoDataDir` if the home directory cannot be determined.
    pub fn new() -> StoreResult<Self> {
        let path = Self::default_path()?;
        Ok(Self { path })
    }

    /// Creates a store at a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the default XDG path for the snapshot file.
    ///
    /// On Unix: `~/.local/share/tv/tasks.json`
    /// On macOS: `~/Library/Application Support/tv/tasks.json`
    pub fn default_path() -> StoreResult<PathBuf> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or(StoreError::NoDataDir)?;

        Ok(project_dirs.data_dir().join(STORE_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    /// Loads the snapshot from disk.
    ///
    /// # Errors
    ///
    /// - Returns `StoreError::ReadError` if the file cannot be read.
    /// - Returns `StoreError::Json` if the file contains invalid JSON.
    pub fn load(&self) -> StoreResult<TaskSnapshot> {
        let contents = fs::read_to_string(&self.path).map_err(|e| StoreError::ReadError {
            path: self.path.clone(),
            source: e,
        })?;
        let snapshot: TaskSnapshot = serde_json::from_str(&contents)?;
        tracing::debug!(path = %self.path.display(), tasks = snapshot.tasks.len(), "loaded tasks");
        Ok(snapshot)
    }

    /// Loads the snapshot, returning an empty one if the file doesn't exist.
    pub fn load_or_default(&self) -> StoreResult<TaskSnapshot> {
        match self.load() {
            Ok(snapshot) => Ok(snapshot),
            Err(e) if e.is_not_found() => Ok(TaskSnapshot::default()),
            Err(e) => Err(e),
        }
    }

    /// Saves the snapshot atomically, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// - Returns `StoreError::CreateDirError` if the directory cannot be created.
    /// - Returns `StoreError::WriteError` if the file cannot be written.
    /// - Returns `StoreError::Json` if serialization fails.
    pub fn save(&self, snapshot: &TaskSnapshot) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::CreateDirError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, &json).map_err(|e| StoreError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| StoreError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %self.path.display(), tasks = snapshot.tasks.len(), "saved tasks");
        Ok(())
    }

    /// Returns true if the snapshot file exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Deletes the snapshot file. A missing file is not an error.
    pub fn delete(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::DeleteError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    // =========================================================================
    // Async I/O Methods
    // =========================================================================

    /// Async equivalent of [`load()`](Self::load).
    pub async fn load_async(&self) -> StoreResult<TaskSnapshot> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| StoreError::ReadError {
                path: self.path.clone(),
                source: e,
            })?;
        let snapshot: TaskSnapshot = serde_json::from_str(&contents)?;
        tracing::debug!(path = %self.path.display(), tasks = snapshot.tasks.len(), "loaded tasks");
        Ok(snapshot)
    }

    /// Async equivalent of [`load_or_default()`](Self::load_or_default).
    pub async fn load_or_default_async(&self) -> StoreResult<TaskSnapshot> {
        match self.load_async().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) if e.is_not_found() => Ok(TaskSnapshot::default()),
            Err(e) => Err(e),
        }
    }

    /// Async equivalent of [`save()`](Self::save).
    pub async fn save_async(&self, snapshot: &TaskSnapshot) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::CreateDirError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| StoreError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::WriteError {
                path: self.path.clone(),
                source: e,
            })?;

        tracing::debug!(path = %self.path.display(), tasks = snapshot.tasks.len(), "saved tasks");
        Ok(())
    }

    /// Async equivalent of [`delete()`](Self::delete).
    pub async fn delete_async(&self) -> StoreResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::DeleteError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskview_model::models::TaskRecord;
    use tempfile::tempdir;

    fn sample() -> TaskSnapshot {
        let mut snapshot = TaskSnapshot::new();
        snapshot.tasks.push(TaskRecord::new("Tasks/a.md", "A"));
        snapshot
    }

    // ==========================================================================
    // Synchronous I/O Tests
    // ==========================================================================

    #[test]
    fn test_default_path_is_xdg_data_path() {
        let path = TaskStore::default_path().expect("should get default path");
        let path_str = path.to_string_lossy();

        assert!(path_str.ends_with("tasks.json"), "unexpected path: {}", path_str);
        assert!(path_str.contains("tv"), "path should contain 'tv': {}", path_str);
        assert!(path.is_absolute(), "path should be absolute: {:?}", path);
    }

    #[test]
    fn test_with_custom_path() {
        let custom_path = PathBuf::from("/tmp/test/tasks.json");
        let store = TaskStore::with_path(custom_path.clone());
        assert_eq!(store.path(), custom_path.as_path());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = TaskStore::with_path(temp_dir.path().join("nested").join("tasks.json"));

        store.save(&sample()).expect("save failed");
        assert!(store.exists());
        assert!(!store.temp_path().exists(), "temp file should be renamed away");

        let loaded = store.load().expect("load failed");
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_read_error_includes_file_path() {
        let store = TaskStore::with_path(PathBuf::from("/nonexistent/path/to/tasks.json"));

        let error = store.load().unwrap_err();
        let error_msg = error.to_string();
        assert!(error_msg.contains("/nonexistent/path/to/tasks.json"), "{}", error_msg);
        assert!(error_msg.contains("failed to read task file"), "{}", error_msg);
        assert!(error.is_not_found());
    }

    #[test]
    fn test_read_error_has_source() {
        use std::error::Error;

        let store = TaskStore::with_path(PathBuf::from("/nonexistent/path/to/tasks.json"));
        let error = store.load().unwrap_err();
        assert!(error.source().is_some(), "error should have a source io::Error");
    }

    #[test]
    fn test_load_or_default_for_missing_file() {
        let store = TaskStore::with_path(PathBuf::from("/nonexistent/path/to/tasks.json"));
        let snapshot = store.load_or_default().expect("should default");
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_load_or_default_propagates_bad_json() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let path = temp_dir.path().join("tasks.json");
        fs::write(&path, "{ not json").expect("failed to write");

        let store = TaskStore::with_path(path);
        assert!(matches!(store.load_or_default(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_write_error_includes_file_path() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let blocker_file = temp_dir.path().join("blocker");
        fs::write(&blocker_file, "blocking").expect("failed to create blocker file");

        let store = TaskStore::with_path(blocker_file.join("subdir").join("tasks.json"));
        let error_msg = store.save(&sample()).unwrap_err().to_string();

        assert!(
            error_msg.contains("failed to create data directory")
                || error_msg.contains("failed to write task file"),
            "error should describe the operation: {}",
            error_msg
        );
        assert!(error_msg.contains("blocker"), "{}", error_msg);
    }

    #[test]
    fn test_delete_missing_file_is_ok() {
        let store = TaskStore::with_path(PathBuf::from("/nonexistent/path/to/tasks.json"));
        assert!(store.delete().is_ok());
    }

    #[test]
    fn test_error_message_format_read() {
        let error = StoreError::ReadError {
            path: PathBuf::from("/home/user/.local/share/tv/tasks.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(
            error.to_string(),
            "failed to read task file '/home/user/.local/share/tv/tasks.json': permission denied"
        );
        assert!(!error.is_not_found());
    }

    // ==========================================================================
    // Async I/O Tests
    // ==========================================================================

    #[tokio::test]
    async fn test_save_and_load_async() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = TaskStore::with_path(temp_dir.path().join("tasks.json"));

        store.save_async(&sample()).await.expect("save_async failed");
        let loaded = store.load_async().await.expect("load_async failed");
        assert_eq!(loaded, sample());
    }

    #[tokio::test]
    async fn test_load_or_default_async_missing_file() {
        let store = TaskStore::with_path(PathBuf::from("/nonexistent/path/to/tasks.json"));
        let snapshot = store.load_or_default_async().await.expect("should default");
        assert!(snapshot.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_delete_async() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let path = temp_dir.path().join("tasks.json");
        let store = TaskStore::with_path(path.clone());

        store.save_async(&sample()).await.expect("save_async failed");
        assert!(path.exists());

        store.delete_async().await.expect("delete_async failed");
        assert!(!path.exists());
    }
}
