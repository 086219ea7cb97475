pub mod error;
pub mod keys;
pub mod records;
pub mod store;

pub use error::StorageError;
pub use keys::{LANGUAGE_KEY, StorageKeys};
pub use records::{GameStorage, RowsRecord};
pub use store::{FileStore, KeyValueStore, MemoryStore};
