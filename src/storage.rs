use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::boards::repo_types::Board;
use crate::tasks::repo_types::Task;

/// The whole persisted state: every user, board and task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Whole-document persistence. Every repo operation is a `load`, an
/// in-memory scan or mutation, and (for writes) a `save`.
///
/// There is no locking between `load` and `save`: two concurrent
/// read-modify-write cycles race and the last `save` wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Never fails: unreadable storage is treated as an empty document.
    async fn load(&self) -> Document;
    async fn save(&self, doc: &Document) -> Result<(), StorageError>;
}

/// Fresh identifier for any record.
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}

pub(crate) fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// JSON document on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens the store, writing an empty document if the file is missing.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let store = Self::new(path);
        if tokio::fs::metadata(&store.path).await.is_err() {
            debug!(path = %store.path.display(), "creating empty data file");
            store.save(&Document::default()).await?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writes `body` to a fresh temp file beside `path`, then renames it over
/// `path`. Each call gets its own temp file.
fn replace_file(path: &Path, body: &[u8]) -> Result<(), StorageError> {
    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(body).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self) -> Document {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "data file unreadable; using empty document");
                return Document::default();
            }
        };
        match serde_json::from_slice(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "data file malformed; using empty document");
                Document::default()
            }
        }
    }

    async fn save(&self, doc: &Document) -> Result<(), StorageError> {
        let body = serde_json::to_vec_pretty(doc)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, &body))
            .await
            .map_err(|e| StorageError::Write {
                path: self.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e),
            })?
    }
}

/// Document held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self) -> Document {
        // A poisoned lock still holds a usable document.
        self.doc.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn save(&self, doc: &Document) -> Result<(), StorageError> {
        let mut guard = self.doc.lock().unwrap_or_else(|e| e.into_inner());
        *guard = doc.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_missing_file_with_empty_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.json");
        let store = JsonFileStore::open(&path).await.expect("open");

        let raw = std::fs::read_to_string(store.path()).expect("file exists");
        let v: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(v["users"], serde_json::json!([]));
        assert_eq!(v["boards"], serde_json::json!([]));
        assert_eq!(v["tasks"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn load_falls_back_to_empty_when_missing_or_malformed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = JsonFileStore::new(dir.path().join("nope.json"));
        let doc = missing.load().await;
        assert!(doc.users.is_empty() && doc.boards.is_empty() && doc.tasks.is_empty());

        let path = dir.path().join("bad.json");
        std::fs::write(&path, b"{not json").expect("write");
        let doc = JsonFileStore::new(&path).load().await;
        assert!(doc.users.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_persists_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::open(dir.path().join("data.json"))
            .await
            .expect("open");

        let user = User {
            id: new_id(),
            email: "a@b.co".into(),
            password_hash: "hash".into(),
            created_at: now(),
        };
        let mut doc = store.load().await;
        doc.users.push(user.clone());
        store.save(&doc).await.expect("save");

        let reloaded = store.load().await;
        assert_eq!(reloaded.users.len(), 1);
        assert_eq!(reloaded.users[0].id, user.id);
        assert_eq!(reloaded.users[0].email, "a@b.co");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(Result::ok)
            .map(|e| e.file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("data.json")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_saves_all_succeed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = std::sync::Arc::new(
            JsonFileStore::open(dir.path().join("data.json"))
                .await
                .expect("open"),
        );

        let mut doc = Document::default();
        for i in 0..500 {
            doc.users.push(User {
                id: new_id(),
                email: format!("user{i}@example.com"),
                password_hash: "hash".into(),
                created_at: now(),
            });
        }
        let doc = std::sync::Arc::new(doc);

        let writers: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                let doc = doc.clone();
                tokio::spawn(async move {
                    let mut failures = 0;
                    for _ in 0..20 {
                        if store.save(&doc).await.is_err() {
                            failures += 1;
                        }
                    }
                    failures
                })
            })
            .collect();

        let mut failures = 0;
        for w in writers {
            failures += w.await.expect("writer task");
        }
        assert_eq!(failures, 0);
        assert_eq!(store.load().await.users.len(), 500);
    }

    #[tokio::test]
    async fn save_into_missing_directory_is_a_storage_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("missing").join("data.json"));
        let err = store.save(&Document::default()).await.unwrap_err();
        assert!(matches!(err, StorageError::Write { .. }));
    }

    #[test]
    fn new_id_is_unique() {
        assert_ne!(new_id(), new_id());
    }
}
