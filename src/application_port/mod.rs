mod auth_error;
mod nonce_service;
mod session_service;
mod token_service;

pub use auth_error::*;
pub use nonce_service::*;
pub use session_service::*;
pub use token_service::*;
