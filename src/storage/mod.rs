// storage/mod.rs
// Backing store access: records, transactional commits, and the SQLite pool

pub mod commit;
pub mod pool;
pub mod record;
#[cfg(test)]
pub mod test_helpers;

// Re-export commonly used items
pub use commit::{BatchCommitter, SqliteCommitter};
pub use pool::{StoreLocation, StoreOptions};
pub use record::{Record, Value};
