use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;
use url::Url;

/// Where the identity provider's consent page lives and how to address it.
#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    pub authorize_url: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
}

pub struct RealSessionService {
    issuer: Arc<dyn TokenIssuer>,
    validator: Arc<dyn TokenValidator>,
    revocation: Arc<dyn RevocationManager>,
    nonces: Arc<dyn NonceService>,
    directory: Arc<dyn UserDirectory>,
    identity: Arc<dyn IdentityExchange>,
    oauth: OAuthClientConfig,
}

impl RealSessionService {
    pub fn new(
        issuer: Arc<dyn TokenIssuer>,
        validator: Arc<dyn TokenValidator>,
        revocation: Arc<dyn RevocationManager>,
        nonces: Arc<dyn NonceService>,
        directory: Arc<dyn UserDirectory>,
        identity: Arc<dyn IdentityExchange>,
        oauth: OAuthClientConfig,
    ) -> Self {
        Self {
            issuer,
            validator,
            revocation,
            nonces,
            directory,
            identity,
            oauth,
        }
    }

    async fn load_user(&self, id: UserId) -> Result<UserRef, AuthError> {
        self.directory
            .find_by_id(id)
            .await?
            .ok_or(AuthError::UnknownPrincipal)
    }

    async fn issue_pair(&self, user: UserRef) -> Result<TokenPair, AuthError> {
        let access = self.issuer.issue_access_token(user)?;
        let refresh = self.issuer.issue_refresh_token(user).await?;
        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_token_expires_at: access.expires_at,
            refresh_token_expires_at: refresh.expires_at,
        })
    }

    fn authorize_url(&self, state: &StateNonce) -> Result<String, AuthError> {
        let url = Url::parse_with_params(
            &self.oauth.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", self.oauth.client_id.as_str()),
                ("redirect_uri", self.oauth.redirect_uri.as_str()),
                ("scope", self.oauth.scope.as_str()),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| AuthError::Internal(format!("invalid authorize url: {}", e)))?;
        Ok(url.into())
    }
}

#[async_trait::async_trait]
impl SessionService for RealSessionService {
    async fn start_session(&self, user: UserId) -> Result<TokenPair, AuthError> {
        let user = self.load_user(user).await?;
        self.issue_pair(user).await
    }

    async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.validator.validate_refresh_token(refresh_token).await?;
        let user = self.load_user(claims.sub).await?;

        if user.token_version != claims.v {
            debug!(user_id = %user.id, presented = %claims.v, current = %user.token_version, "stale refresh token");
            return Err(AuthError::VersionMismatch);
        }

        // Only the caller whose DEL actually removed the record may proceed.
        if !self
            .revocation
            .invalidate_refresh_token(claims.sub, claims.jti)
            .await?
        {
            return Err(AuthError::RevokedCredential);
        }

        self.issue_pair(user).await
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = self.validator.validate_refresh_token(refresh_token).await?;
        self.revocation
            .invalidate_refresh_token(claims.sub, claims.jti)
            .await?;
        Ok(())
    }

    async fn logout_all(&self, user: UserId) -> Result<(), AuthError> {
        self.revocation.log_out_everywhere(user).await?;
        Ok(())
    }

    async fn begin_oauth_login(&self) -> Result<OAuthRedirect, AuthError> {
        let state = self.nonces.issue().await?;
        let authorize_url = self.authorize_url(&state)?;
        Ok(OAuthRedirect {
            state,
            authorize_url,
        })
    }

    async fn complete_oauth_login(
        &self,
        state: &str,
        code: &str,
    ) -> Result<TokenPair, AuthError> {
        if !self.nonces.consume(state).await {
            return Err(AuthError::InvalidState);
        }
        let user_id = self.identity.exchange(code).await?;
        info!(user_id = %user_id, "oauth login completed");
        self.start_session(user_id).await
    }
}
