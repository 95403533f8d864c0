//! Local filesystem backend.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use futures::{FutureExt, future::BoxFuture};
use tokio::{fs, io::AsyncWriteExt};

use super::ByteStorage;
use crate::dao::storage::{StorageError, StorageResult};

/// Byte storage on the local filesystem. Files are private to the
/// server's user and synced to disk before a write completes.
///
/// A write lands in a sibling `.tmp` file that is then renamed over the
/// target, so a crash never leaves a truncated file behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl FsStorage {
    /// Create the filesystem backend.
    pub fn new() -> Self {
        Self
    }
}

/// `path` with `.tmp` appended, in the same directory.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

async fn write_synced(path: &Path, contents: &[u8]) -> StorageResult<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options
        .open(path)
        .await
        .map_err(|err| StorageError::io("create", path, err))?;
    file.write_all(contents)
        .await
        .map_err(|err| StorageError::io("write", path, err))?;
    file.sync_all()
        .await
        .map_err(|err| StorageError::io("sync", path, err))
}

impl ByteStorage for FsStorage {
    fn read(&self, path: &Path) -> BoxFuture<'static, StorageResult<Option<Vec<u8>>>> {
        let path = path.to_path_buf();
        async move {
            match fs::read(&path).await {
                Ok(contents) => Ok(Some(contents)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(StorageError::io("read", path, err)),
            }
        }
        .boxed()
    }

    fn write(&self, path: &Path, contents: Vec<u8>) -> BoxFuture<'static, StorageResult<()>> {
        let path = path.to_path_buf();
        async move {
            let staging = staging_path(&path);
            let replaced = match write_synced(&staging, &contents).await {
                Ok(()) => fs::rename(&staging, &path)
                    .await
                    .map_err(|err| StorageError::io("replace", &path, err)),
                Err(err) => Err(err),
            };
            if replaced.is_err() {
                let _ = fs::remove_file(&staging).await;
            }
            replaced
        }
        .boxed()
    }

    fn rename(&self, from: &Path, to: &Path) -> BoxFuture<'static, StorageResult<()>> {
        let (from, to) = (from.to_path_buf(), to.to_path_buf());
        async move {
            fs::rename(&from, &to)
                .await
                .map_err(|err| StorageError::io("rename", from, err))
        }
        .boxed()
    }

    fn remove(&self, path: &Path) -> BoxFuture<'static, StorageResult<()>> {
        let path = path.to_path_buf();
        async move {
            fs::remove_file(&path)
                .await
                .map_err(|err| StorageError::io("remove", path, err))
        }
        .boxed()
    }

    fn exists(&self, path: &Path) -> BoxFuture<'static, StorageResult<bool>> {
        let path = path.to_path_buf();
        async move {
            fs::try_exists(&path)
                .await
                .map_err(|err| StorageError::io("stat", path, err))
        }
        .boxed()
    }
}
