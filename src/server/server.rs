use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::{OAuth, Settings, Token};
use anyhow::anyhow;
use std::sync::Arc;

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// The assembled service graph shared by every request.
pub struct Server {
    pub session_service: Arc<dyn SessionService>,
    pub access_guard: Arc<AccessGuard>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let identity_backend = IdentityBackend::from_settings(&settings.oauth)?;

        let store: Arc<dyn KeyValueStore> = match settings.store.backend.as_str() {
            "redis" => {
                let url = settings.store.url.as_deref().unwrap_or(DEFAULT_REDIS_URL);
                Arc::new(RedisKeyValueStore::connect(url).await?)
            }
            "memory" => Arc::new(MemoryKeyValueStore::new()),
            other => return Err(anyhow!("Unknown store backend: {}", other)),
        };

        // token versions share the store with the refresh records
        let users: Arc<dyn UserDirectory> = Arc::new(StoreUserDirectory::new(store.clone()));

        let identity: Arc<dyn IdentityExchange> = match identity_backend {
            IdentityBackend::Fake => {
                warn!("fake identity exchange enabled, any caller can log in as any user");
                Arc::new(FakeIdentityExchange::new(users.clone()))
            }
            IdentityBackend::Disabled => Arc::new(DisabledIdentityExchange),
        };

        for setting in settings.token.default_secrets() {
            warn!(setting, "built-in default secret in use, not fit for production");
        }

        let server = Self::assemble(
            store,
            users,
            identity,
            &settings.token,
            oauth_client_config(&settings.oauth),
        );
        info!(
            store = %settings.store.backend,
            check_access_version = settings.token.check_access_version,
            "server assembled"
        );
        Ok(server)
    }

    pub fn assemble(
        store: Arc<dyn KeyValueStore>,
        directory: Arc<dyn UserDirectory>,
        identity: Arc<dyn IdentityExchange>,
        token: &Token,
        oauth: OAuthClientConfig,
    ) -> Self {
        let codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            access: ClassKey::new(token.access_secret.as_bytes(), token.access_ttl()),
            refresh: ClassKey::new(token.refresh_secret.as_bytes(), token.refresh_ttl()),
        }));

        let tokens = Arc::new(StoreBackedTokenService::new(
            codec.clone(),
            TokenHasher::new(token.hash_secret.as_bytes()),
            store.clone(),
            directory.clone(),
        ));
        let nonces: Arc<dyn NonceService> = Arc::new(StoreNonceService::new(store));

        let session_service: Arc<dyn SessionService> = Arc::new(RealSessionService::new(
            tokens.clone(),
            tokens.clone(),
            tokens,
            nonces,
            directory.clone(),
            identity,
            oauth,
        ));

        let access_guard = Arc::new(if token.check_access_version {
            AccessGuard::with_version_check(codec, directory)
        } else {
            AccessGuard::stateless(codec)
        });

        Self {
            session_service,
            access_guard,
        }
    }
}

enum IdentityBackend {
    Fake,
    Disabled,
}

impl IdentityBackend {
    fn from_settings(oauth: &OAuth) -> anyhow::Result<Self> {
        match oauth.backend.as_str() {
            "fake" if oauth.allow_fake_login => Ok(IdentityBackend::Fake),
            "fake" => Err(anyhow!(
                "oauth.backend = \"fake\" requires oauth.allow_fake_login = true (development only)"
            )),
            "disabled" => Ok(IdentityBackend::Disabled),
            other => Err(anyhow!("Unknown oauth backend: {}", other)),
        }
    }
}

fn oauth_client_config(oauth: &OAuth) -> OAuthClientConfig {
    OAuthClientConfig {
        authorize_url: oauth.authorize_url.clone(),
        client_id: oauth.client_id.clone(),
        redirect_uri: oauth.redirect_uri.clone(),
        scope: oauth.scope.clone(),
    }
}
