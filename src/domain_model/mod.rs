mod nonce;
mod token;
mod user;

pub use nonce::*;
pub use token::*;
pub use user::*;
