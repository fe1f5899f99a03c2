//! HTTP plumbing shared by the login, renewal and request paths.

mod client;
pub(crate) mod endpoints;

pub use client::HttpClient;
pub(crate) use client::{map_reqwest, parse_error_response};
