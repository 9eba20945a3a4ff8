use keyward::api;
use keyward::application_impl::{FakeIdentityExchange, OAuthClientConfig, StoreUserDirectory};
use keyward::domain_model::UserId;
use keyward::domain_port::UserDirectory;
use keyward::infra_memory::MemoryKeyValueStore;
use keyward::server::Server;
use keyward::settings::Token;
use serde_json::{Value, json};
use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;

fn server(check_access_version: bool) -> Arc<Server> {
    let store = Arc::new(MemoryKeyValueStore::new());
    let users: Arc<dyn UserDirectory> = Arc::new(StoreUserDirectory::new(store.clone()));
    let token = Token {
        check_access_version,
        ..Token::default()
    };
    let server = Server::assemble(
        store,
        users.clone(),
        Arc::new(FakeIdentityExchange::new(users.clone())),
        &token,
        OAuthClientConfig {
            authorize_url: "https://provider.test/oauth/authorize".to_string(),
            client_id: "client-1".to_string(),
            redirect_uri: "http://localhost/api/v1/auth/oauth/callback".to_string(),
            scope: "profile".to_string(),
        },
    );
    Arc::new(server)
}

fn app(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone {
    warp::path("api")
        .and(warp::path("v1"))
        .and(api::v1::routes(server))
        .recover(api::v1::recover_error)
}

fn body(res: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}

async fn login(server: &Arc<Server>, user: UserId) -> Value {
    let filter = app(server.clone());
    let redirect = server.session_service.begin_oauth_login().await.unwrap();
    let res = warp::test::request()
        .method("GET")
        .path(&format!(
            "/api/v1/auth/oauth/callback?code={}&state={}",
            FakeIdentityExchange::code_for(user),
            redirect.state
        ))
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    body(&res)["data"].clone()
}

#[tokio::test]
async fn whoami_requires_a_bearer_access_token() {
    let server = server(false);
    let filter = app(server.clone());

    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/auth/whoami")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&res)["error"]["code"], "MISSING_CREDENTIAL");

    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/auth/whoami")
        .header("authorization", "Bearer not.a.jwt")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&res)["error"]["code"], "INVALID_CREDENTIAL");

    let tokens = login(&server, UserId(10)).await;
    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/auth/whoami")
        .header(
            "authorization",
            format!("Bearer {}", tokens["access_token"].as_str().unwrap()),
        )
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let json = body(&res);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["user_id"], "10");

    // a refresh token is not an access token
    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/auth/whoami")
        .header(
            "authorization",
            format!("Bearer {}", tokens["refresh_token"].as_str().unwrap()),
        )
        .reply(&filter)
        .await;
    assert_eq!(body(&res)["error"]["code"], "INVALID_CREDENTIAL");
}

#[tokio::test]
async fn refresh_rotates_and_rejects_replay() {
    let server = server(false);
    let filter = app(server.clone());
    let tokens = login(&server, UserId(11)).await;
    let refresh_token = tokens["refresh_token"].clone();

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/refresh")
        .json(&json!({ "refresh_token": refresh_token }))
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let rotated = body(&res)["data"].clone();
    assert_ne!(rotated["refresh_token"], refresh_token);
    assert!(rotated["access_token_expires_at"].is_string());

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/refresh")
        .json(&json!({ "refresh_token": refresh_token }))
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&res)["error"]["code"], "REVOKED_CREDENTIAL");

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/refresh")
        .body("{}")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_then_refresh_is_revoked() {
    let server = server(false);
    let filter = app(server.clone());
    let tokens = login(&server, UserId(12)).await;
    let refresh = json!({ "refresh_token": tokens["refresh_token"] });

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/logout")
        .json(&refresh)
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/refresh")
        .json(&refresh)
        .reply(&filter)
        .await;
    assert_eq!(body(&res)["error"]["code"], "REVOKED_CREDENTIAL");
}

#[tokio::test]
async fn logout_all_with_version_check_rejects_old_access_tokens() {
    let server = server(true);
    let filter = app(server.clone());
    let tokens = login(&server, UserId(13)).await;
    let bearer = format!("Bearer {}", tokens["access_token"].as_str().unwrap());

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/logout_all")
        .header("authorization", &bearer)
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/auth/whoami")
        .header("authorization", &bearer)
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&res)["error"]["code"], "VERSION_MISMATCH");

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/refresh")
        .json(&json!({ "refresh_token": tokens["refresh_token"] }))
        .reply(&filter)
        .await;
    assert_eq!(body(&res)["error"]["code"], "REVOKED_CREDENTIAL");
}

#[tokio::test]
async fn oauth_login_redirects_with_state_and_callback_is_single_use() {
    let server = server(false);
    let filter = app(server.clone());

    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/auth/oauth/login")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    let location = res.headers()["location"].to_str().unwrap().to_string();
    assert!(location.starts_with("https://provider.test/oauth/authorize?"));
    let state = url::Url::parse(&location)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();

    let callback = format!(
        "/api/v1/auth/oauth/callback?code={}&state={}",
        FakeIdentityExchange::code_for(UserId(14)),
        state
    );
    let res = warp::test::request()
        .method("GET")
        .path(&callback)
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body(&res)["data"]["access_token"].is_string());

    let res = warp::test::request()
        .method("GET")
        .path(&callback)
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&res)["error"]["code"], "INVALID_STATE");
}

#[tokio::test]
async fn unknown_paths_use_the_error_envelope() {
    let server = server(false);
    let filter = app(server);
    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/auth/nope")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let json = body(&res);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}
