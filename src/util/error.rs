// ChiloDisco - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all ChiloDisco operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum DashboardError {
    /// Fetching or decoding a log snapshot failed.
    Fetch(FetchError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// The session key-value store could not be read or written.
    Store(StoreError),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Fetch error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Store(e) => write!(f, "Session store error: {e}"),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Store(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Fetch errors
// ---------------------------------------------------------------------------

/// Errors raised while fetching a snapshot from `/api/logs`.
#[derive(Debug)]
pub enum FetchError {
    /// The configured base URL cannot be turned into a request URL.
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be constructed.
    Client { source: reqwest::Error },

    /// The request failed before a response arrived (connect, timeout, ...).
    Request { url: String, source: reqwest::Error },

    /// The server answered with a non-success status.
    Status { url: String, status: u16 },

    /// The response body could not be decoded as a snapshot.
    Decode { url: String, source: reqwest::Error },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl { url, reason } => {
                write!(f, "Invalid server URL '{url}': {reason}")
            }
            Self::Client { source } => write!(f, "Failed to build HTTP client: {source}"),
            Self::Request { url, source } => write!(f, "Request to '{url}' failed: {source}"),
            Self::Status { url, status } => {
                write!(f, "Server returned HTTP {status} for '{url}'")
            }
            Self::Decode { url, source } => {
                write!(f, "Malformed snapshot from '{url}': {source}")
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Client { source } => Some(source),
            Self::Request { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FetchError> for DashboardError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for DashboardError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

/// Errors raised by a session key-value store.
///
/// Callers treat every variant as non-fatal: preferences fall back to their
/// in-memory defaults.
#[derive(Debug)]
pub enum StoreError {
    /// The backing file could not be read or written.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },

    /// A stored value (or the backing file) is not valid JSON.
    Json {
        key: String,
        source: serde_json::Error,
    },

    /// The store refuses writes (quota exhausted, storage disabled).
    Unavailable { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
            Self::Json { key, source } => write!(f, "Invalid JSON under '{key}': {source}"),
            Self::Unavailable { reason } => write!(f, "Store unavailable: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Unavailable { .. } => None,
        }
    }
}

impl From<StoreError> for DashboardError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Convenience type alias for ChiloDisco results.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_status_error_message_names_url_and_code() {
        let e = FetchError::Status {
            url: "http://host/api/logs".to_string(),
            status: 503,
        };
        assert_eq!(
            e.to_string(),
            "Server returned HTTP 503 for 'http://host/api/logs'"
        );
    }

    #[test]
    fn test_dashboard_error_preserves_source_chain() {
        let io = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let e: DashboardError = StoreError::Io {
            path: PathBuf::from("/tmp/session.json"),
            operation: "write",
            source: io,
        }
        .into();
        assert!(e.to_string().starts_with("Session store error: I/O error during write"));
        let store = e.source().expect("store error as source");
        assert!(store.source().is_some(), "io error must stay in the chain");
    }
}
