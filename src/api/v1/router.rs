use super::error::*;
use super::handler;
use crate::application_impl::{AccessGuard, Principal};
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let refresh = warp::path("refresh")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.session_service.clone()))
        .and_then(handler::refresh);

    let logout = warp::path("logout")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.session_service.clone()))
        .and_then(handler::logout);

    let logout_all = warp::path("logout_all")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_access_guard(server.access_guard.clone()))
        .and(with(server.session_service.clone()))
        .and_then(handler::logout_all);

    let whoami = warp::path("whoami")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_access_guard(server.access_guard.clone()))
        .and_then(handler::whoami);

    let oauth_login = warp::path!("oauth" / "login")
        .and(warp::get())
        .and(with(server.session_service.clone()))
        .and_then(handler::oauth_login);

    let oauth_callback = warp::path!("oauth" / "callback")
        .and(warp::get())
        .and(warp::query::<handler::OAuthCallbackQuery>())
        .and(with(server.session_service.clone()))
        .and_then(handler::oauth_callback);

    warp::path("auth").and(
        refresh
            .or(logout)
            .or(logout_all)
            .or(whoami)
            .or(oauth_login)
            .or(oauth_callback),
    )
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// Admits the request only with a valid access token and hands the
/// principal to the handler.
fn with_access_guard(
    guard: Arc<AccessGuard>,
) -> impl Filter<Extract = (Principal,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(
        move |authorization: Option<String>| {
            let guard = guard.clone();
            async move {
                guard
                    .admit(authorization.as_deref())
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)
            }
        },
    )
}
