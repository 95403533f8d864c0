//! In-process backend used by tests and throwaway servers.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use futures::future::{self, BoxFuture, FutureExt};

use super::ByteStorage;
use crate::dao::storage::{StorageError, StorageResult};

/// Byte storage kept in memory, with switches to simulate I/O failures.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    fail_renames: AtomicBool,
}

impl InMemoryStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of `path`.
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files().get(path).cloned()
    }

    /// Seed `path` with `contents` without counting it as a write.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files().insert(path.into(), contents.into());
    }

    /// Number of files currently stored.
    pub fn file_count(&self) -> usize {
        self.files().len()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every following write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every following rename fail (or succeed again).
    pub fn set_fail_renames(&self, fail: bool) {
        self.fail_renames.store(fail, Ordering::SeqCst);
    }

    fn files(&self) -> MutexGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn injected(operation: &'static str, path: &Path) -> StorageError {
    StorageError::Io {
        operation,
        path: path.to_path_buf(),
        source: std::io::Error::other("injected failure"),
    }
}

impl ByteStorage for InMemoryStorage {
    fn read(&self, path: &Path) -> BoxFuture<'static, StorageResult<Option<Vec<u8>>>> {
        future::ready(Ok(self.contents(path))).boxed()
    }

    fn write(&self, path: &Path, contents: Vec<u8>) -> BoxFuture<'static, StorageResult<()>> {
        let result = if self.fail_writes.load(Ordering::SeqCst) {
            Err(injected("write", path))
        } else {
            self.files().insert(path.to_path_buf(), contents);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };
        future::ready(result).boxed()
    }

    fn rename(&self, from: &Path, to: &Path) -> BoxFuture<'static, StorageResult<()>> {
        let result = if self.fail_renames.load(Ordering::SeqCst) {
            Err(injected("rename", from))
        } else {
            let mut files = self.files();
            match files.remove(from) {
                Some(contents) => {
                    files.insert(to.to_path_buf(), contents);
                    Ok(())
                }
                None => Err(StorageError::NotFound {
                    path: from.to_path_buf(),
                }),
            }
        };
        future::ready(result).boxed()
    }

    fn remove(&self, path: &Path) -> BoxFuture<'static, StorageResult<()>> {
        let result = match self.files().remove(path) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound {
                path: path.to_path_buf(),
            }),
        };
        future::ready(result).boxed()
    }

    fn exists(&self, path: &Path) -> BoxFuture<'static, StorageResult<bool>> {
        future::ready(Ok(self.files().contains_key(path))).boxed()
    }
}
