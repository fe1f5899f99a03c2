//! Core traits for credential storage and the remote authorization server.

mod auth_api;
mod token_store;

pub use auth_api::AuthApi;
pub use token_store::TokenStore;
