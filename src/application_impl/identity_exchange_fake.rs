use crate::domain_model::UserId;
use crate::domain_port::*;
use std::sync::Arc;

const FAKE_CODE_PREFIX: &str = "fake-code:";

/// Stand-in for the provider's code/profile exchange. Development only.
///
/// Accepts codes shaped `fake-code:<user id>` and provisions that user on first
/// sight, the way a real provider login upserts the local account. Anyone who
/// can reach the callback can pick the user, so the server only wires it up
/// when `oauth.allow_fake_login` is set.
pub struct FakeIdentityExchange {
    directory: Arc<dyn UserDirectory>,
}

impl FakeIdentityExchange {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    pub fn code_for(user: UserId) -> String {
        format!("{}{}", FAKE_CODE_PREFIX, user)
    }
}

#[async_trait::async_trait]
impl IdentityExchange for FakeIdentityExchange {
    async fn exchange(&self, code: &str) -> Result<UserId, IdentityExchangeError> {
        let user_id = code
            .strip_prefix(FAKE_CODE_PREFIX)
            .and_then(|id| id.parse::<UserId>().ok())
            .ok_or(IdentityExchangeError::Rejected)?;
        self.directory
            .provision(user_id)
            .await
            .map_err(|e| IdentityExchangeError::Provider(e.to_string()))?;
        Ok(user_id)
    }
}

/// Provider login switched off: every code is refused.
pub struct DisabledIdentityExchange;

#[async_trait::async_trait]
impl IdentityExchange for DisabledIdentityExchange {
    async fn exchange(&self, _code: &str) -> Result<UserId, IdentityExchangeError> {
        Err(IdentityExchangeError::Rejected)
    }
}
