mod fs;
mod memory;

use std::path::Path;

use futures::future::BoxFuture;

pub use self::{fs::FsStorage, memory::InMemoryStorage};
use crate::dao::storage::StorageResult;

/// Durable byte storage: game snapshots and uploaded photos go through it.
pub trait ByteStorage: Send + Sync {
    /// Read a whole file, `None` when it does not exist.
    fn read(&self, path: &Path) -> BoxFuture<'static, StorageResult<Option<Vec<u8>>>>;
    /// Create or replace a file with `contents`.
    fn write(&self, path: &Path, contents: Vec<u8>) -> BoxFuture<'static, StorageResult<()>>;
    /// Move `from` to `to`, replacing `to`.
    fn rename(&self, from: &Path, to: &Path) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete a file. A missing file yields [`StorageError::NotFound`].
    ///
    /// [`StorageError::NotFound`]: crate::dao::storage::StorageError::NotFound
    fn remove(&self, path: &Path) -> BoxFuture<'static, StorageResult<()>>;
    /// Whether a file exists at `path`.
    fn exists(&self, path: &Path) -> BoxFuture<'static, StorageResult<bool>>;
}
