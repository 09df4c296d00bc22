//! Storage abstractions for last-seen listing state.
//!
//! One entry per target name holding the canonical result from the most
//! recent cycle in which the target had matches. Entries are never deleted.
//!
//! - `RedisStore`: production backend, one connection manager per run
//! - `FileStore`: single JSON file for local runs without Redis
//! - `MemoryStore`: in-process map for tests and dry runs

pub mod local;
pub mod memory;
pub mod redis;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use self::local::FileStore;
pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Trait for key-value state backends.
///
/// A missing key is `Ok(None)`, never an error. Implementations must
/// tolerate concurrent calls for different keys.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the stored value for a key.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value for a key.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
