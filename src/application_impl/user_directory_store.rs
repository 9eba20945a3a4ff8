use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

const USER_VERSION_KEY_PREFIX: &str = "user_version";

pub fn user_version_key(id: UserId) -> String {
    format!("{}:{}", USER_VERSION_KEY_PREFIX, id)
}

/// Token versions kept in the shared key-value store as `user_version:<id>`,
/// without expiry, so they outlive the process alongside the refresh records.
pub struct StoreUserDirectory {
    store: Arc<dyn KeyValueStore>,
}

impl StoreUserDirectory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

fn parse_version(id: UserId, raw: &str) -> Result<TokenVersion, UserDirectoryError> {
    raw.parse::<u32>().map(TokenVersion).map_err(|e| {
        UserDirectoryError::Backend(format!("corrupt token version for user {}: {}", id, e))
    })
}

#[async_trait::async_trait]
impl UserDirectory for StoreUserDirectory {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRef>, UserDirectoryError> {
        match self.store.get(&user_version_key(id)).await? {
            Some(raw) => Ok(Some(UserRef::new(id, parse_version(id, &raw)?))),
            None => Ok(None),
        }
    }

    async fn provision(&self, id: UserId) -> Result<UserRef, UserDirectoryError> {
        let key = user_version_key(id);
        if self.store.set_nx(&key, "0").await? {
            info!(user_id = %id, "user provisioned");
            return Ok(UserRef::new(id, TokenVersion::default()));
        }
        self.find_by_id(id).await?.ok_or_else(|| {
            UserDirectoryError::Backend(format!("user {} vanished while provisioning", id))
        })
    }

    async fn increment_token_version(&self, id: UserId) -> Result<(), UserDirectoryError> {
        let key = user_version_key(id);
        // INCR would create the record, so unknown users are checked first.
        if self.store.get(&key).await?.is_none() {
            debug!(user_id = %id, "version bump for unknown user ignored");
            return Ok(());
        }
        let version = self.store.incr(&key).await?;
        if version < 0 || version > i64::from(u32::MAX) {
            return Err(UserDirectoryError::Backend(format!(
                "token version for user {} out of range: {}",
                id, version
            )));
        }
        info!(user_id = %id, version, "token version bumped");
        Ok(())
    }
}
