use crate::application_port::AuthError;
use crate::domain_model::StateNonce;

#[async_trait::async_trait]
pub trait NonceService: Send + Sync {
    async fn issue(&self) -> Result<StateNonce, AuthError>;

    /// True exactly once per issued nonce. Store failures count as `false`.
    async fn consume(&self, nonce: &str) -> bool;
}
