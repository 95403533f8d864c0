/// Durable byte storage for snapshots and uploaded photos.
pub mod byte_store;
/// Storage error types shared by every backend.
pub mod storage;
