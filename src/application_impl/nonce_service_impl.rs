use crate::application_port::*;
use crate::domain_model::StateNonce;
use crate::domain_port::KeyValueStore;
use crate::logger::*;
use std::sync::Arc;
use std::time::Duration;

pub const STATE_NONCE_TTL: Duration = Duration::from_secs(5 * 60);

const STATE_KEY_PREFIX: &str = "oauth_state";
const STATE_MARKER: &str = "1";

/// Single-use CSRF state for the third-party login handshake.
pub struct StoreNonceService {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl StoreNonceService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            ttl: STATE_NONCE_TTL,
        }
    }

    fn key(nonce: &str) -> String {
        format!("{}:{}", STATE_KEY_PREFIX, nonce)
    }
}

#[async_trait::async_trait]
impl NonceService for StoreNonceService {
    async fn issue(&self) -> Result<StateNonce, AuthError> {
        let nonce = StateNonce::generate();
        self.store
            .set_ex(&Self::key(nonce.as_str()), STATE_MARKER, self.ttl.as_secs())
            .await?;
        Ok(nonce)
    }

    async fn consume(&self, nonce: &str) -> bool {
        if !StateNonce::is_well_formed(nonce) {
            return false;
        }
        // GETDEL: two concurrent callbacks cannot both observe the marker
        match self.store.get_del(&Self::key(nonce)).await {
            Ok(Some(marker)) => marker == STATE_MARKER,
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "state nonce lookup failed, rejecting");
                false
            }
        }
    }
}
