use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        *code
    } else if err.is_not_found() {
        ApiErrorCode::NotFound
    } else if err.find::<warp::body::BodyDeserializeError>().is_some()
        || err.find::<warp::reject::InvalidQuery>().is_some()
    {
        ApiErrorCode::BadRequest
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::MethodNotAllowed
    } else {
        warn!("unhandled rejection: {:?}", err);
        ApiErrorCode::InternalError
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(code, code.to_string()));
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Error, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    #[error("Missing bearer credential")]
    MissingCredential,
    #[error("Credential is not valid")]
    InvalidCredential,
    #[error("Credential has expired")]
    CredentialExpired,
    #[error("Credential has been revoked")]
    RevokedCredential,
    #[error("Credential was issued before the last logout")]
    VersionMismatch,
    #[error("Unknown principal")]
    UnknownPrincipal,
    #[error("Login state is missing, expired or already used")]
    InvalidState,
    #[error("Malformed request")]
    BadRequest,
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::MissingCredential
            | ApiErrorCode::InvalidCredential
            | ApiErrorCode::CredentialExpired
            | ApiErrorCode::RevokedCredential
            | ApiErrorCode::VersionMismatch
            | ApiErrorCode::UnknownPrincipal
            | ApiErrorCode::InvalidState => StatusCode::UNAUTHORIZED,
            ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::MissingCredential => ApiErrorCode::MissingCredential,
            AuthError::InvalidCredential => ApiErrorCode::InvalidCredential,
            AuthError::CredentialExpired => ApiErrorCode::CredentialExpired,
            AuthError::RevokedCredential => ApiErrorCode::RevokedCredential,
            AuthError::VersionMismatch => ApiErrorCode::VersionMismatch,
            AuthError::UnknownPrincipal => ApiErrorCode::UnknownPrincipal,
            AuthError::InvalidState => ApiErrorCode::InvalidState,
            AuthError::Store(e) => ApiErrorCode::internal(e),
            AuthError::Internal(e) => ApiErrorCode::internal(e),
        }
    }
}
