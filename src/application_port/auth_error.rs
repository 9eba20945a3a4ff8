use crate::domain_port::{IdentityExchangeError, StoreError, UserDirectoryError};
use crate::domain_model::TokenClass;

/// Failure modes of the token codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("signature invalid")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("expected a {expected} token, got {found}")]
    WrongType {
        expected: TokenClass,
        found: TokenClass,
    },
    #[error("token encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,
    #[error("invalid credential")]
    InvalidCredential,
    #[error("credential expired")]
    CredentialExpired,
    #[error("credential revoked")]
    RevokedCredential,
    #[error("token version mismatch")]
    VersionMismatch,
    #[error("unknown principal")]
    UnknownPrincipal,
    #[error("invalid or reused login state")]
    InvalidState,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CodecError> for AuthError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Expired => AuthError::CredentialExpired,
            CodecError::SignatureInvalid
            | CodecError::Malformed(_)
            | CodecError::WrongType { .. } => AuthError::InvalidCredential,
            CodecError::Encode(e) => AuthError::Internal(e),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Store(err.to_string())
    }
}

impl From<UserDirectoryError> for AuthError {
    fn from(err: UserDirectoryError) -> Self {
        AuthError::Store(err.to_string())
    }
}

impl From<IdentityExchangeError> for AuthError {
    fn from(err: IdentityExchangeError) -> Self {
        match err {
            IdentityExchangeError::Rejected => AuthError::InvalidCredential,
            IdentityExchangeError::Provider(e) => AuthError::Internal(e),
        }
    }
}
