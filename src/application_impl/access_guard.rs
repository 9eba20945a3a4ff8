use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::UserDirectory;
use serde::Serialize;
use std::sync::Arc;

/// The authenticated caller attached to an accepted request.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
}

/// Pulls the credential out of an `Authorization` header value.
/// Anything other than a non-empty bearer credential counts as no token.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let (scheme, credential) = header?.trim().split_once(' ')?;
    let credential = credential.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !credential.is_empty() {
        Some(credential)
    } else {
        None
    }
}

/// Request-time filter over access tokens.
///
/// ```text
/// no bearer credential        -> MissingCredential
/// malformed / bad signature   -> InvalidCredential
/// expired                     -> CredentialExpired
/// refresh token presented     -> InvalidCredential
/// valid access token          -> Principal(sub)
/// ```
///
/// A stateless guard never touches a store, so a global logout only takes
/// effect once outstanding access tokens expire. With a user directory
/// attached, the guard also rejects stale versions and vanished users.
pub struct AccessGuard {
    codec: Arc<dyn TokenCodec>,
    directory: Option<Arc<dyn UserDirectory>>,
}

impl AccessGuard {
    pub fn stateless(codec: Arc<dyn TokenCodec>) -> Self {
        Self {
            codec,
            directory: None,
        }
    }

    pub fn with_version_check(
        codec: Arc<dyn TokenCodec>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            codec,
            directory: Some(directory),
        }
    }

    /// Signature, expiry and type only.
    pub fn inspect(&self, authorization: Option<&str>) -> Result<AccessClaims, AuthError> {
        let token = bearer_token(authorization).ok_or(AuthError::MissingCredential)?;
        match self.codec.verify(token, TokenClass::Access)? {
            TokenClaims::Access(claims) => Ok(claims),
            TokenClaims::Refresh(_) => Err(AuthError::InvalidCredential),
        }
    }

    pub async fn admit(&self, authorization: Option<&str>) -> Result<Principal, AuthError> {
        let claims = self.inspect(authorization)?;

        if let Some(directory) = &self.directory {
            let user = directory
                .find_by_id(claims.sub)
                .await?
                .ok_or(AuthError::UnknownPrincipal)?;
            if user.token_version != claims.v {
                return Err(AuthError::VersionMismatch);
            }
        }

        Ok(Principal {
            user_id: claims.sub,
        })
    }
}
