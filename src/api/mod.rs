//! Access to the remote storefront REST API.
//! `client` owns credential attachment and failure classification; `resources`
//! holds the typed records and one function per endpoint.

mod client;
mod transport;
pub mod resources;

pub use client::{classify_response, ApiClient, ApiError, AuthRequirement};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use reqwest::Method;
