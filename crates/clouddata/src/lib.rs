#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for client operations.
///
/// Use this target for logging client construction, handle resolution, and query fetches.
pub const TRACING_TARGET_CLIENT: &str = "clouddata::client";

/// Tracing target for zone change enumeration.
///
/// Use this target for logging change pages, token loads and token saves.
pub const TRACING_TARGET_CHANGES: &str = "clouddata::changes";

/// Tracing target for provider operations.
///
/// Use this target for logging remote requests and their outcomes.
pub const TRACING_TARGET_PROVIDER: &str = "clouddata::provider";

mod client;
mod error;

pub mod changes;
pub mod database;
pub mod prelude;
pub mod provider;
pub mod query;
pub mod record;

pub use client::{CloudClient, CloudConfig, NAME_FIELD, Partition};
pub use error::{BoxedError, Error, RemoteError, RemoteErrorCode, Result};
