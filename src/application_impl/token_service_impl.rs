use crate::application_impl::TokenHasher;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

const REFRESH_KEY_PREFIX: &str = "refresh";
const SCAN_BATCH: usize = 100;

pub fn refresh_key(user: UserId, jti: Jti) -> String {
    format!("{}:{}:{}", REFRESH_KEY_PREFIX, user, jti)
}

fn refresh_pattern(user: UserId) -> String {
    format!("{}:{}:*", REFRESH_KEY_PREFIX, user)
}

/// Issuer, validator and revocation manager for refresh tokens, all backed by
/// one key-value store holding `refresh:<user>:<jti> -> hmac(token)`.
///
/// A record exists exactly while its refresh token is usable; deleting it is
/// the only way to revoke one.
pub struct StoreBackedTokenService {
    codec: Arc<dyn TokenCodec>,
    hasher: TokenHasher,
    store: Arc<dyn KeyValueStore>,
    directory: Arc<dyn UserDirectory>,
}

impl StoreBackedTokenService {
    pub fn new(
        codec: Arc<dyn TokenCodec>,
        hasher: TokenHasher,
        store: Arc<dyn KeyValueStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            codec,
            hasher,
            store,
            directory,
        }
    }

    fn record_ttl_secs(&self) -> u64 {
        self.codec.ttl(TokenClass::Refresh).as_secs().max(1)
    }
}

#[async_trait::async_trait]
impl TokenIssuer for StoreBackedTokenService {
    fn issue_access_token(
        &self,
        user: UserRef,
    ) -> Result<Issued<AccessToken, AccessClaims>, AuthError> {
        Ok(self.codec.sign_access(user)?)
    }

    async fn issue_refresh_token(
        &self,
        user: UserRef,
    ) -> Result<Issued<RefreshToken, RefreshClaims>, AuthError> {
        let jti = Jti::new_v4();
        let issued = self.codec.sign_refresh(user, jti)?;
        let digest = self.hasher.hmac_hex(&issued.token.0)?;

        let key = refresh_key(user.id, jti);
        let ttl_secs = self.record_ttl_secs();
        self.store
            .set_ex(&key, &digest, ttl_secs)
            .await
            .map_err(|e| {
                error!(user_id = %user.id, error = %e, "refresh record write failed");
                AuthError::from(e)
            })?;
        match self.store.ttl(&key).await {
            Ok(stored_ttl) => {
                debug!(user_id = %user.id, %jti, ttl_secs, ?stored_ttl, "refresh record stored")
            }
            Err(e) => warn!(user_id = %user.id, %jti, error = %e, "refresh record ttl unreadable"),
        }

        Ok(issued)
    }
}

#[async_trait::async_trait]
impl TokenValidator for StoreBackedTokenService {
    async fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        let claims = match self.codec.verify(token, TokenClass::Refresh)? {
            TokenClaims::Refresh(claims) => claims,
            TokenClaims::Access(_) => return Err(AuthError::InvalidCredential),
        };

        let key = refresh_key(claims.sub, claims.jti);
        let stored = match self.store.get(&key).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(user_id = %claims.sub, error = %e, "refresh record lookup failed, rejecting");
                return Err(AuthError::InvalidCredential);
            }
        };

        // the record is authoritative over the signature
        let Some(stored) = stored else {
            debug!(user_id = %claims.sub, jti = %claims.jti, "refresh record absent");
            return Err(AuthError::RevokedCredential);
        };

        if !self.hasher.matches(token, &stored)? {
            warn!(user_id = %claims.sub, jti = %claims.jti, "refresh record hash mismatch");
            return Err(AuthError::InvalidCredential);
        }

        Ok(claims)
    }
}

#[async_trait::async_trait]
impl RevocationManager for StoreBackedTokenService {
    async fn invalidate_refresh_token(&self, user: UserId, jti: Jti) -> Result<bool, AuthError> {
        let key = refresh_key(user, jti);
        let deleted = self.store.del(&[key]).await?;
        info!(user_id = %user, %jti, deleted, "refresh record deleted");
        Ok(deleted > 0)
    }

    async fn invalidate_all_user_tokens(&self, user: UserId) -> Result<u64, AuthError> {
        let pattern = refresh_pattern(user);
        let mut cursor = 0;
        let mut deleted = 0;
        loop {
            let (next, keys) = self.store.scan(cursor, &pattern, SCAN_BATCH).await?;
            if !keys.is_empty() {
                deleted += self.store.del(&keys).await?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        info!(user_id = %user, deleted, "refresh records swept");
        Ok(deleted)
    }

    async fn log_out_everywhere(&self, user: UserId) -> Result<u64, AuthError> {
        // Bump first: a record written by a racing issuance survives the sweep
        // but carries the old version, which rotation refuses.
        self.directory.increment_token_version(user).await?;
        self.invalidate_all_user_tokens(user).await
    }
}
