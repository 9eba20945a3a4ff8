use crate::application_port::{AuthError, TokenPair};
use crate::domain_model::{StateNonce, UserId};

#[derive(Debug, Clone)]
pub struct OAuthRedirect {
    pub state: StateNonce,
    pub authorize_url: String,
}

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    /// Issues a token pair for a user whose credentials were checked elsewhere.
    async fn start_session(&self, user: UserId) -> Result<TokenPair, AuthError>;
    async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError>;
    async fn logout_all(&self, user: UserId) -> Result<(), AuthError>;
    async fn begin_oauth_login(&self) -> Result<OAuthRedirect, AuthError>;
    async fn complete_oauth_login(&self, state: &str, code: &str)
    -> Result<TokenPair, AuthError>;
}
