//! Web-services provider configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Default web-services endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.apple-cloudkit.com";

/// Default timeout for HTTP requests: 30 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Container environment addressed by requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    /// Schema under development.
    #[default]
    Development,
    /// Deployed schema.
    Production,
}

/// Configuration for the web-services provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct WebServiceConfig {
    /// Web-services endpoint
    #[cfg_attr(
        feature = "config",
        arg(
            long = "cloud-base-url",
            env = "CLOUD_BASE_URL",
            default_value = DEFAULT_BASE_URL
        )
    )]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API token issued for the container
    #[cfg_attr(feature = "config", arg(long = "cloud-api-token", env = "CLOUD_API_TOKEN"))]
    pub api_token: String,

    /// Web auth token of the signed-in user, required for the private partition
    #[cfg_attr(
        feature = "config",
        arg(long = "cloud-web-auth-token", env = "CLOUD_WEB_AUTH_TOKEN")
    )]
    #[serde(default)]
    pub web_auth_token: Option<String>,

    /// Container environment
    #[cfg_attr(
        feature = "config",
        arg(
            long = "cloud-environment",
            env = "CLOUD_ENVIRONMENT",
            value_enum,
            default_value = "development"
        )
    )]
    #[serde(default)]
    pub environment: Environment,

    /// Request timeout in seconds (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "cloud-timeout", env = "CLOUD_TIMEOUT_SECS")
    )]
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User-Agent header to send with requests (optional)
    #[cfg_attr(feature = "config", arg(long = "cloud-user-agent", env = "CLOUD_USER_AGENT"))]
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl WebServiceConfig {
    /// Create a new configuration with an API token and default endpoint.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            api_token: api_token.into(),
            web_auth_token: None,
            environment: Environment::default(),
            timeout_secs: None,
            user_agent: None,
        }
    }

    /// Set the web-services endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the web auth token of the signed-in user.
    #[must_use]
    pub fn with_web_auth_token(mut self, token: impl Into<String>) -> Self {
        self.web_auth_token = Some(token.into());
        self
    }

    /// Set the container environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set the User-Agent header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Returns the effective timeout, using default if unset or zero.
    pub fn effective_timeout(&self) -> Duration {
        match self.timeout_secs {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => DEFAULT_TIMEOUT,
        }
    }

    /// Returns the effective user agent, using default if unset or empty.
    pub fn effective_user_agent(&self) -> String {
        match self.user_agent.as_deref() {
            Some(agent) if !agent.is_empty() => agent.to_string(),
            _ => format!("clouddata/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(format!("Invalid base URL format: {}", self.base_url));
        }

        if self.api_token.is_empty() {
            return Err("API token cannot be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = WebServiceConfig::new("token");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.effective_timeout(), DEFAULT_TIMEOUT);
        assert!(config.effective_user_agent().starts_with("clouddata/"));
    }

    #[test]
    fn test_effective_values() {
        let config = WebServiceConfig::new("token")
            .with_timeout_secs(0)
            .with_user_agent("");
        assert_eq!(config.effective_timeout(), DEFAULT_TIMEOUT);
        assert!(config.effective_user_agent().starts_with("clouddata/"));

        let config = WebServiceConfig::new("token")
            .with_timeout_secs(5)
            .with_user_agent("recipes/1.0");
        assert_eq!(config.effective_timeout(), Duration::from_secs(5));
        assert_eq!(config.effective_user_agent(), "recipes/1.0");
    }

    #[test]
    fn test_config_validation() {
        assert!(WebServiceConfig::new("token").validate().is_ok());
        assert!(WebServiceConfig::new("").validate().is_err());
        assert!(
            WebServiceConfig::new("token")
                .with_base_url("ftp://example.com")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_environment_strings() {
        assert_eq!(Environment::Production.to_string(), "production");
        assert_eq!(
            "development".parse::<Environment>().unwrap(),
            Environment::Development
        );
    }
}
