#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store rejected command: {0}")]
    Rejected(String),
}

/// The narrow slice of a networked key-value store the token machinery relies on.
///
/// Every method maps onto one store command, so each call is atomic at the
/// store. Expiry is owned by the store, never by callers.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// `SET key value EX ttl_secs`
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;

    /// `SET key value NX`, without expiry. Returns whether the key was written.
    async fn set_nx(&self, key: &str, value: &str) -> Result<bool, StoreError>;

    /// `INCR key`, returning the new value. Keeps any expiry the key already has.
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;

    /// `GET key`
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// `DEL key...`, returning how many of the keys existed.
    async fn del(&self, keys: &[String]) -> Result<u64, StoreError>;

    /// `GETDEL key`: read and remove in a single step.
    async fn get_del(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// One `SCAN cursor MATCH pattern COUNT count` step.
    /// Iteration starts at cursor `0` and is over when the returned cursor is `0` again.
    async fn scan(
        &self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>), StoreError>;

    /// Remaining lifetime in seconds, `None` when the key is absent or never expires.
    async fn ttl(&self, key: &str) -> Result<Option<u64>, StoreError>;
}
