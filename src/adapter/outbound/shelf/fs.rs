//! Directory-backed shelf.
//!
//! Layout:
//!
//! ```text
//! <root>/context.json   registry snapshot, identifier -> record
//! <root>/package.json   shelf metadata, {"name": ...}
//! ```
//!
//! Both files are pretty-printed JSON with four-space indentation. Every
//! write goes to a sibling `.tmp` file that is synced and then renamed over
//! the target, so a crash never leaves a torn snapshot behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::domain::record::Snapshot;
use crate::error::PersistenceError;
use crate::port::outbound::shelf::{ShelfMetadata, ShelfStore};

/// File holding the registry snapshot.
pub const SNAPSHOT_FILE: &str = "context.json";
/// File holding the shelf metadata.
pub const METADATA_FILE: &str = "package.json";

/// Shelf stored in a local directory.
#[derive(Debug, Clone)]
pub struct FsShelf {
    root: PathBuf,
}

impl FsShelf {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Shelf directory. Relative executor sources resolve against it.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(SNAPSHOT_FILE)
    }

    #[must_use]
    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    async fn ensure_file<T: Serialize>(
        &self,
        path: &Path,
        default: &T,
    ) -> Result<(), PersistenceError> {
        let exists = fs::try_exists(path)
            .await
            .map_err(|source| PersistenceError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if !exists {
            write_json_atomic(path, default).await?;
            info!(path = %path.display(), "Created shelf file");
        }
        Ok(())
    }
}

#[async_trait]
impl ShelfStore for FsShelf {
    async fn ensure(&self) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| PersistenceError::Write {
                path: self.root.clone(),
                source,
            })?;

        self.ensure_file(&self.snapshot_path(), &Snapshot::new())
            .await?;
        self.ensure_file(&self.metadata_path(), &ShelfMetadata::default())
            .await?;
        Ok(())
    }

    async fn load(&self) -> Result<Snapshot, PersistenceError> {
        let path = self.snapshot_path();
        let snapshot: Snapshot = read_json(&path).await?;

        if let Some((key, expected, uri)) = snapshot.find_inconsistent() {
            return Err(PersistenceError::KeyMismatch { key, expected, uri });
        }

        debug!(path = %path.display(), records = snapshot.len(), "Loaded snapshot");
        Ok(snapshot)
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let path = self.snapshot_path();
        write_json_atomic(&path, snapshot).await?;
        debug!(path = %path.display(), records = snapshot.len(), "Persisted snapshot");
        Ok(())
    }

    async fn metadata(&self) -> Result<ShelfMetadata, PersistenceError> {
        read_json(&self.metadata_path()).await
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistenceError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| PersistenceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&content).map_err(|source| PersistenceError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, PersistenceError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(PersistenceError::Encode)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Write `value` to `path` via temp file, fsync and rename.
async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    // Encode before touching the filesystem.
    let json = to_pretty_json(value)?;

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let write_err = |source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    };

    let result = async {
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path).await;
        return Err(write_err(e));
    }
    sync_parent(path).await.map_err(write_err)
}

/// Flush the directory holding `path` so a completed rename is durable.
#[cfg(unix)]
async fn sync_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::File::open(parent).await?.sync_all().await
        }
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
async fn sync_parent(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
