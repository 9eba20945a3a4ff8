mod identity_exchange;
mod key_value_store;
mod user_directory;

pub use identity_exchange::*;
pub use key_value_store::*;
pub use user_directory::*;
