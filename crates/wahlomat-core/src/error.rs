//! Error types for the Wahl-O-Mat agent.

use thiserror::Error;

/// A shared error type for the entire application.
///
/// Every failure of a user action ends up as one of these variants. None of them is
/// fatal: the presentation layer prints the error and the session stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WahlError {
    /// No API key was supplied before a remote call.
    #[error("No OpenAI API key set. Please enter your API key first.")]
    CredentialMissing,

    /// Transport, HTTP or decoding failure while talking to the assistant service.
    #[error("Assistant service call failed{}: {message}", status_suffix(.status_code))]
    RemoteCall {
        status_code: Option<u16>,
        message: String,
    },

    /// The remote run reached a terminal state other than `completed`.
    #[error("Assistant run ended with status '{status}'{}", reason_suffix(.reason))]
    RunNotCompleted {
        status: String,
        reason: Option<String>,
    },

    /// The poll loop exceeded the configured run timeout.
    #[error("Assistant run did not finish within {waited_secs}s")]
    RunTimedOut { waited_secs: u64 },

    /// The caller cancelled the request.
    #[error("Request cancelled")]
    Cancelled,

    /// Party name outside the configured catalog.
    #[error("Unknown party: '{0}'")]
    InvalidParty(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (config file access)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },
}

fn status_suffix(status_code: &Option<u16>) -> String {
    status_code
        .map(|code| format!(" (HTTP {code})"))
        .unwrap_or_default()
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(": {r}"))
        .unwrap_or_default()
}

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, WahlError>;

impl WahlError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a RemoteCall error without an HTTP status (transport/decoding failures)
    pub fn remote_call(message: impl Into<String>) -> Self {
        Self::RemoteCall {
            status_code: None,
            message: message.into(),
        }
    }

    /// Creates a RemoteCall error for a non-success HTTP response
    pub fn remote_status(status_code: u16, message: impl Into<String>) -> Self {
        Self::RemoteCall {
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_credential_missing(&self) -> bool {
        matches!(self, Self::CredentialMissing)
    }

    /// True for every failure that originated in the remote run sequence.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteCall { .. } | Self::RunNotCompleted { .. } | Self::RunTimedOut { .. }
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// True when the service rejected the credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::RemoteCall {
                status_code: Some(401),
                ..
            }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for WahlError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for WahlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for WahlError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}
