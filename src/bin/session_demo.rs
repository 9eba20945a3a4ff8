/// Walks one user through the whole session lifecycle against in-memory stores:
/// provider login, rotation, replay of a used refresh token and a global logout.
///
/// $ cargo run --bin session_demo
use keyward::application_impl::{FakeIdentityExchange, OAuthClientConfig, StoreUserDirectory};
use keyward::domain_model::UserId;
use keyward::domain_port::{KeyValueStore, UserDirectory};
use keyward::infra_memory::MemoryKeyValueStore;
use keyward::server::Server;
use keyward::settings::Token;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::new("keyward=debug,session_demo=debug"))
        .with(fmt::layer())
        .init();

    let store = Arc::new(MemoryKeyValueStore::new());
    let users: Arc<dyn UserDirectory> = Arc::new(StoreUserDirectory::new(store.clone()));
    let identity = Arc::new(FakeIdentityExchange::new(users.clone()));
    let server = Server::assemble(
        store.clone(),
        users,
        identity,
        &Token::default(),
        OAuthClientConfig {
            authorize_url: "https://provider.example/oauth/authorize".to_string(),
            client_id: "demo-client".to_string(),
            redirect_uri: "http://localhost:8080/api/v1/auth/oauth/callback".to_string(),
            scope: "profile".to_string(),
        },
    );
    let sessions = &server.session_service;

    let redirect = sessions.begin_oauth_login().await?;
    println!("redirect to: {}", redirect.authorize_url);

    let code = FakeIdentityExchange::code_for(UserId(42));
    let pair = sessions
        .complete_oauth_login(redirect.state.as_str(), &code)
        .await?;
    println!("logged in, refresh records: {}", refresh_records(&store).await?);

    let header = format!("Bearer {}", pair.access_token.0);
    let principal = server.access_guard.admit(Some(&header)).await?;
    println!("access token admits user {}", principal.user_id);

    let replay = sessions
        .complete_oauth_login(redirect.state.as_str(), &code)
        .await;
    println!("state replay: {:?}", replay.err());

    let rotated = sessions.rotate(&pair.refresh_token.0).await?;
    println!("rotated, new refresh expires at {}", rotated.refresh_token_expires_at);
    println!(
        "old refresh token: {:?}",
        sessions.rotate(&pair.refresh_token.0).await.err()
    );

    sessions.logout_all(principal.user_id).await?;
    println!(
        "after global logout: {:?}, refresh records: {}",
        sessions.rotate(&rotated.refresh_token.0).await.err(),
        refresh_records(&store).await?
    );

    Ok(())
}

async fn refresh_records(store: &MemoryKeyValueStore) -> anyhow::Result<usize> {
    let (_, keys) = store.scan(0, "refresh:*", 1000).await?;
    Ok(keys.len())
}
