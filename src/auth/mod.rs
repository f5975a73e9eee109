//! Authentication: credentials, token storage, and the single-flight
//! refresh coordinator (spec §4.3).

mod coordinator;
mod credentials;
mod token_store;

pub use coordinator::{Authenticator, RefreshCoordinator};
pub use credentials::AuthCredentials;
pub use token_store::{InMemoryTokenStore, TokenStore};
