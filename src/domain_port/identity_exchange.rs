use crate::domain_model::UserId;

#[derive(Debug, thiserror::Error)]
pub enum IdentityExchangeError {
    #[error("authorization code rejected")]
    Rejected,
    #[error("identity provider error: {0}")]
    Provider(String),
}

/// Trades a provider authorization code for a local user, provisioning it if needed.
#[async_trait::async_trait]
pub trait IdentityExchange: Send + Sync {
    async fn exchange(&self, code: &str) -> Result<UserId, IdentityExchangeError>;
}
