mod access_guard;
mod identity_exchange_fake;
mod jwt_codec;
mod nonce_service_impl;
mod session_service_impl;
mod token_hasher;
mod token_service_impl;
mod user_directory_store;

pub use access_guard::*;
pub use identity_exchange_fake::*;
pub use jwt_codec::*;
pub use nonce_service_impl::*;
pub use session_service_impl::*;
pub use token_hasher::*;
pub use token_service_impl::*;
pub use user_directory_store::*;
