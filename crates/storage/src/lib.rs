pub mod db;
pub mod log_store;
pub mod persistence;

pub use db::SqlitePersistence;
pub use log_store::{LogStore, SNAPSHOT_KEY};
pub use persistence::{JsonFilePersistence, MemoryPersistence, SnapshotPersistence, StorageError};
