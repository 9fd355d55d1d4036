pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use error::{KvStoreError, Result};
pub use file::FileKvStore;
pub use memory::InMemoryKvStore;
pub use store::{KeyValueStore, KeyValueStoreExt, validate_key};
