//! Web-services provider.
//!
//! Speaks the platform's JSON API: every operation is a `POST` to
//! `{base_url}/database/1/{container}/{environment}/{partition}/{operation}`
//! authenticated with `ckAPIToken` and, for user data, `ckWebAuthToken`
//! query parameters.

mod web_config;
mod web_provider;
mod wire;

pub use web_config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, Environment, WebServiceConfig};
pub use web_provider::WebServiceProvider;
