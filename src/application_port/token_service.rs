use crate::application_port::{AuthError, CodecError};
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct RefreshToken(pub String);

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct Issued<T, C> {
    pub token: T,
    pub claims: C,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// Signs and verifies claim sets, one secret and expiry window per token class.
pub trait TokenCodec: Send + Sync {
    fn sign_access(&self, user: UserRef) -> Result<Issued<AccessToken, AccessClaims>, CodecError>;

    fn sign_refresh(
        &self,
        user: UserRef,
        jti: Jti,
    ) -> Result<Issued<RefreshToken, RefreshClaims>, CodecError>;

    /// Checks signature and expiry with the secret of `expected`, then rejects
    /// claim sets whose `typ` is a different class.
    fn verify(&self, token: &str, expected: TokenClass) -> Result<TokenClaims, CodecError>;

    fn ttl(&self, class: TokenClass) -> Duration;
}

#[async_trait::async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Stateless: no store interaction.
    fn issue_access_token(
        &self,
        user: UserRef,
    ) -> Result<Issued<AccessToken, AccessClaims>, AuthError>;

    /// Signs a refresh token and records its keyed hash. The token is only
    /// returned once the record write has completed.
    async fn issue_refresh_token(
        &self,
        user: UserRef,
    ) -> Result<Issued<RefreshToken, RefreshClaims>, AuthError>;
}

#[async_trait::async_trait]
pub trait TokenValidator: Send + Sync {
    /// Signature, expiry, type tag, live store record and hash match, in that order.
    async fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, AuthError>;
}

#[async_trait::async_trait]
pub trait RevocationManager: Send + Sync {
    /// Deletes one refresh record. Returns whether it still existed.
    async fn invalidate_refresh_token(&self, user: UserId, jti: Jti) -> Result<bool, AuthError>;

    /// Sweeps every refresh record of `user`. Not atomic against concurrent issuance.
    async fn invalidate_all_user_tokens(&self, user: UserId) -> Result<u64, AuthError>;

    /// Bumps the token version, then sweeps the refresh records.
    async fn log_out_everywhere(&self, user: UserId) -> Result<u64, AuthError>;
}
