//! Owned shared value guarded by a single mutex.

use tokio::sync::Mutex;

/// A value shared by every request handler, reachable only through short
/// critical sections.
///
/// There is one lock for readers and writers alike, so every `read` and
/// `modify` call is serialized and state transitions are linearizable.
/// Callbacks run while the lock is held: keep them free of I/O and other
/// blocking work.
#[derive(Debug, Default)]
pub struct StateStore<T> {
    value: Mutex<T>,
}

impl<T> StateStore<T> {
    /// Wrap an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }

    /// Inspect the current value.
    ///
    /// The visitor's return type cannot borrow from the value, so nothing
    /// escapes the critical section. The lock is released when the visitor
    /// returns or unwinds.
    pub async fn read<R>(&self, visitor: impl FnOnce(&T) -> R) -> R {
        let guard = self.value.lock().await;
        visitor(&guard)
    }

    /// Run a read-modify-write transform and hand its outcome back.
    ///
    /// A transform returning `Err` must leave the value untouched: validate
    /// first, mutate last.
    pub async fn modify<R, E>(
        &self,
        transform: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Result<R, E> {
        let mut guard = self.value.lock().await;
        transform(&mut guard)
    }
}
