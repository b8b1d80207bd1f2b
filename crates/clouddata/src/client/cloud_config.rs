//! Client configuration.

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// One of the three isolated database scopes within a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Partition {
    /// Records owned by the signed-in user.
    #[default]
    Private,
    /// Records readable by every user of the application.
    Public,
    /// Records other users have shared with the signed-in user.
    Shared,
}

/// Configuration of the container, partition and zone a client targets.
///
/// Values are immutable once constructed: fields are private and the
/// `with_*` builders consume `self`. Nothing is validated on construction, a
/// blank identifier or a missing zone surfaces as a remote failure on the
/// first fetch. Call [`CloudConfig::validate`] to check up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct CloudConfig {
    /// Identifier of the remote container (e.g. `iCloud.com.example.app`)
    #[cfg_attr(feature = "config", arg(long = "cloud-container", env = "CLOUD_CONTAINER"))]
    container_identifier: String,

    /// Database partition to read from
    #[cfg_attr(
        feature = "config",
        arg(
            long = "cloud-partition",
            env = "CLOUD_PARTITION",
            value_enum,
            default_value = "private"
        )
    )]
    #[serde(default)]
    partition: Partition,

    /// Zone used when a fetch does not name one
    #[cfg_attr(feature = "config", arg(long = "cloud-zone", env = "CLOUD_ZONE"))]
    #[serde(default)]
    zone: Option<String>,
}

impl CloudConfig {
    /// Create a new configuration for the given container and partition.
    pub fn new(container_identifier: impl Into<String>, partition: Partition) -> Self {
        Self {
            container_identifier: container_identifier.into(),
            partition,
            zone: None,
        }
    }

    /// Shorthand for a private partition configuration.
    pub fn private(container_identifier: impl Into<String>) -> Self {
        Self::new(container_identifier, Partition::Private)
    }

    /// Set the zone used when a fetch does not name one.
    #[must_use]
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// Returns the container identifier.
    #[inline]
    pub fn container_identifier(&self) -> &str {
        &self.container_identifier
    }

    /// Returns the configured partition.
    #[inline]
    pub fn partition(&self) -> Partition {
        self.partition
    }

    /// Returns the configured zone, if any.
    #[inline]
    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        if self.container_identifier.trim().is_empty() {
            return Err("Container identifier cannot be empty".to_string());
        }

        if let Some(zone) = &self.zone
            && zone.trim().is_empty()
        {
            return Err("Zone name cannot be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config() {
        let config = CloudConfig::new("iCloud.com.example.recipes", Partition::Private);
        assert_eq!(config.container_identifier(), "iCloud.com.example.recipes");
        assert_eq!(config.partition(), Partition::Private);
        assert_eq!(config.zone(), None);
    }

    #[test]
    fn test_config_builder() {
        let config = CloudConfig::private("iCloud.com.example.recipes").with_zone("Recipes");
        assert_eq!(config.partition(), Partition::Private);
        assert_eq!(config.zone(), Some("Recipes"));
    }

    #[test]
    fn test_construction_does_not_validate() {
        let config = CloudConfig::new("", Partition::Shared);
        assert_eq!(config.container_identifier(), "");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        assert!(CloudConfig::private("iCloud.com.example").validate().is_ok());
        assert!(CloudConfig::private("   ").validate().is_err());
        assert!(
            CloudConfig::private("iCloud.com.example")
                .with_zone("")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_partition_strings() {
        assert_eq!(Partition::Private.to_string(), "private");
        assert_eq!("shared".parse::<Partition>().unwrap(), Partition::Shared);
        assert!("global".parse::<Partition>().is_err());
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: CloudConfig =
            serde_json::from_str(r#"{"container_identifier":"iCloud.com.example"}"#).unwrap();
        assert_eq!(config.partition(), Partition::Private);
        assert_eq!(config.zone(), None);

        let config: CloudConfig = serde_json::from_str(
            r#"{"container_identifier":"iCloud.com.example","partition":"public","zone":"Feed"}"#,
        )
        .unwrap();
        assert_eq!(config.partition(), Partition::Public);
        assert_eq!(config.zone(), Some("Feed"));
    }
}
