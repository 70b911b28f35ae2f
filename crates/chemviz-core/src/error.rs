//! Error types for the chemviz client.

use thiserror::Error;

/// A shared error type for every chemviz crate.
///
/// Variants follow the failure classes a session can hit: local validation,
/// authorization, transport, and server-reported errors. None of them is
/// fatal to a session; the controller turns each into a status line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChemvizError {
    /// Local validation failure. Never reaches the network.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Another upload is still in flight for this session.
    #[error("An upload is already in progress")]
    UploadInProgress,

    /// The backend rejected the credentials (401/403).
    #[error("Authorization failed (HTTP {status})")]
    Auth { status: u16 },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Non-success response from the backend, with the server-provided
    /// message when the body carried one.
    #[error("Server error (HTTP {status}): {}", message.as_deref().unwrap_or("no details"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    /// Transport-level failure (connection refused, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The report exporter could not save a report.
    #[error("Export error: {0}")]
    Export(String),
}

impl ChemvizError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Server error
    pub fn server(status: u16, message: Option<String>) -> Self {
        Self::Server { status, message }
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Export error
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an authorization failure
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Check if this is a local validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Short classification used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::UploadInProgress => "upload_in_progress",
            Self::Auth { .. } => "auth",
            Self::NotFound { .. } => "not_found",
            Self::Server { .. } => "server",
            Self::Network(_) => "network",
            Self::Serialization { .. } => "serialization",
            Self::Io { .. } => "io",
            Self::Config(_) => "config",
            Self::Export(_) => "export",
        }
    }

    /// Human-readable status text for this error.
    ///
    /// Server errors that carried a message surface that message; every
    /// other failure (including auth and transport) collapses to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::Validation(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ChemvizError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ChemvizError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ChemvizError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ChemvizError>`.
pub type Result<T> = std::result::Result<T, ChemvizError>;
