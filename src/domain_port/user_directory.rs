use crate::domain_model::{UserId, UserRef};
use crate::domain_port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum UserDirectoryError {
    #[error("user directory error: {0}")]
    Backend(String),
}

impl From<StoreError> for UserDirectoryError {
    fn from(err: StoreError) -> Self {
        UserDirectoryError::Backend(err.to_string())
    }
}

/// Read/bump access to the per-user token versions.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRef>, UserDirectoryError>;

    /// Creates the user at version 0 unless it already exists, and returns the
    /// current record either way.
    async fn provision(&self, id: UserId) -> Result<UserRef, UserDirectoryError>;

    /// Bumps the user's token version. Unknown users are ignored.
    async fn increment_token_version(&self, id: UserId) -> Result<(), UserDirectoryError>;
}
