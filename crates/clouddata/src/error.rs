//! Error types and utilities for record store operations.

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::Partition;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for all record store operations in this crate.
///
/// This is a convenience type alias that defaults to using [`Error`] as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for record store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fetching is not implemented for the configured partition.
    ///
    /// This is permanent and should not be retried.
    #[error("{partition} fetch not implemented")]
    UnsupportedPartition { partition: Partition },

    /// The remote platform rejected the call or one of the matched records.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A fetched record could not be decoded into the requested type.
    #[error("Failed to decode record '{record_name}': {source}")]
    RecordDecode {
        record_name: String,
        #[source]
        source: BoxedError,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Change token storage failed.
    #[error("Change token store error: {reason}")]
    TokenStore { reason: String },
}

impl Error {
    /// Create an unsupported partition error.
    pub fn unsupported_partition(partition: Partition) -> Self {
        Self::UnsupportedPartition { partition }
    }

    /// Create a record decode error.
    pub fn record_decode(record_name: impl Into<String>, source: impl Into<BoxedError>) -> Self {
        Self::RecordDecode {
            record_name: record_name.into(),
            source: source.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a token store error.
    pub fn token_store(reason: impl Into<String>) -> Self {
        Self::TokenStore {
            reason: reason.into(),
        }
    }

    /// Returns the remote error, if this error came from the platform.
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote(err) => Some(err),
            _ => None,
        }
    }

    /// Get a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            Error::UnsupportedPartition { partition } => {
                format!("Pending the implementation of data collection from a {partition} database.")
            }
            Error::Remote(err) if err.code == RemoteErrorCode::NotAuthenticated => {
                "Not signed in to the cloud account.".to_string()
            }
            Error::Remote(err) if err.code.is_retryable() => {
                "The cloud service is unavailable. Please try again.".to_string()
            }
            Error::RecordDecode { .. } => "Data format error in a stored record.".to_string(),
            Error::InvalidConfig { reason } => format!("Configuration error: {reason}"),
            _ => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

/// Categories of failures reported by the remote platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RemoteErrorCode {
    /// The request never reached the platform or the response was lost.
    NetworkFailure,
    /// Missing or rejected credentials.
    NotAuthenticated,
    /// Storage or request quota exceeded.
    QuotaExceeded,
    /// Request throttled by the platform.
    Throttled,
    /// The requested zone does not exist.
    ZoneNotFound,
    /// The requested record does not exist.
    UnknownItem,
    /// The platform rejected the request shape.
    BadRequest,
    /// Internal platform failure.
    ServerError,
    /// Unrecognized failure.
    #[default]
    Unknown,
}

impl RemoteErrorCode {
    /// Check if this error code is typically transient.
    ///
    /// The client never retries on its own; this is a hint for callers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkFailure | Self::Throttled | Self::ServerError
        )
    }

    /// Maps a platform error code string (e.g. `ZONE_NOT_FOUND`) to a code.
    pub fn from_server_code(code: &str) -> Self {
        match code {
            "AUTHENTICATION_FAILED" | "AUTHENTICATION_REQUIRED" | "ACCESS_DENIED" => {
                Self::NotAuthenticated
            }
            "QUOTA_EXCEEDED" => Self::QuotaExceeded,
            "THROTTLED" | "TRY_AGAIN_LATER" => Self::Throttled,
            "ZONE_NOT_FOUND" => Self::ZoneNotFound,
            "NOT_FOUND" | "UNKNOWN_ITEM" => Self::UnknownItem,
            "BAD_REQUEST" | "INVALID_ARGUMENTS" => Self::BadRequest,
            "INTERNAL_ERROR" | "SERVICE_UNAVAILABLE" => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

/// A failure reported by the remote platform, for a whole call or a single record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Remote query failed [{code}]: {message}")]
pub struct RemoteError {
    /// Failure category.
    pub code: RemoteErrorCode,
    /// Message as reported by the platform or transport.
    pub message: String,
    /// Record the failure belongs to, for per-record failures.
    pub record_name: Option<String>,
}

impl RemoteError {
    /// Creates a new remote error.
    pub fn new(code: RemoteErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            record_name: None,
        }
    }

    /// Attaches the record the failure belongs to.
    #[must_use]
    pub fn with_record_name(mut self, record_name: impl Into<String>) -> Self {
        self.record_name = Some(record_name.into());
        self
    }

    /// Creates a network failure error.
    pub fn network_failure(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorCode::NetworkFailure, message)
    }

    /// Creates a zone not found error.
    pub fn zone_not_found(zone_name: &str) -> Self {
        Self::new(
            RemoteErrorCode::ZoneNotFound,
            format!("zone '{zone_name}' does not exist"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_partition_message() {
        let err = Error::unsupported_partition(Partition::Public);
        assert_eq!(err.to_string(), "public fetch not implemented");

        let err = Error::unsupported_partition(Partition::Shared);
        assert_eq!(err.to_string(), "shared fetch not implemented");
        assert!(err.user_message().contains("shared database"));
    }

    #[test]
    fn test_remote_error_is_transparent() {
        let err: Error = RemoteError::zone_not_found("Recipes").into();
        assert!(err.to_string().contains("zone_not_found"));
        assert_eq!(
            err.as_remote().map(|e| e.code),
            Some(RemoteErrorCode::ZoneNotFound)
        );
    }

    #[test]
    fn test_server_code_mapping() {
        assert_eq!(
            RemoteErrorCode::from_server_code("AUTHENTICATION_REQUIRED"),
            RemoteErrorCode::NotAuthenticated
        );
        assert_eq!(
            RemoteErrorCode::from_server_code("ZONE_NOT_FOUND"),
            RemoteErrorCode::ZoneNotFound
        );
        assert_eq!(
            RemoteErrorCode::from_server_code("SOMETHING_NEW"),
            RemoteErrorCode::Unknown
        );
    }

    #[test]
    fn test_retryable_codes() {
        assert!(RemoteErrorCode::Throttled.is_retryable());
        assert!(RemoteErrorCode::NetworkFailure.is_retryable());
        assert!(!RemoteErrorCode::BadRequest.is_retryable());
        assert!(!RemoteErrorCode::NotAuthenticated.is_retryable());
    }
}
