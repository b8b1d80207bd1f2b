//! Client configuration and the record client.

mod cloud_client;
mod cloud_config;

pub use cloud_client::{CloudClient, NAME_FIELD};
pub use cloud_config::{CloudConfig, Partition};
