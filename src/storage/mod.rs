mod memory;
mod sqlite;

use crate::error::StoreResult;

pub use self::memory::MemoryStorage;
pub use self::sqlite::SqliteStorage;

/// Key under which the published collection is stored.
pub const PUBLISHED_KEY: &str = "portfolio_blogs";

/// Key under which the draft collection is stored.
pub const DRAFTS_KEY: &str = "portfolio_blog_drafts";

/// Key under which the admin session record is stored.
pub const SESSION_KEY: &str = "portfolio_admin_session";

/// Flat string key-value persistence shared by the content store and the
/// session gate.
///
/// Writes are last-write-wins. Nothing spans more than one key, so callers
/// that touch two keys get two independent writes.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Insert or replace the value under `key`.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}
