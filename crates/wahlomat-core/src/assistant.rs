//! Assistant client port.
//!
//! Defines the interface the session layer uses to reach a hosted assistant, together
//! with the run-status model shared by every implementation.

use crate::credential::Credential;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_MAIN_ASSISTANT_ID: &str = "asst_xnXPdkToqybNQpN2JqEeHvoq";
pub const DEFAULT_ANALYSIS_ASSISTANT_ID: &str = "asst_diIqcxsbblceAkCif2G5JoZW";
pub const DEFAULT_PARTY_COMPARISON_ASSISTANT_ID: &str = "asst_h8pbx53cTHgsaxZG5TiSUQ7F";

/// The three remote behavior profiles the application talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssistantKind {
    /// Main conversational assistant.
    Main,
    /// Classifies the chat history against the party platforms.
    Analysis,
    /// Compares the chat history with one selected party.
    PartyComparison,
}

impl fmt::Display for AssistantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssistantKind::Main => "main",
            AssistantKind::Analysis => "analysis",
            AssistantKind::PartyComparison => "party_comparison",
        };
        f.write_str(name)
    }
}

/// Assistant identifiers per [`AssistantKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantIds {
    #[serde(default = "default_main")]
    pub main: String,
    #[serde(default = "default_analysis")]
    pub analysis: String,
    #[serde(default = "default_party_comparison")]
    pub party_comparison: String,
}

fn default_main() -> String {
    DEFAULT_MAIN_ASSISTANT_ID.to_string()
}

fn default_analysis() -> String {
    DEFAULT_ANALYSIS_ASSISTANT_ID.to_string()
}

fn default_party_comparison() -> String {
    DEFAULT_PARTY_COMPARISON_ASSISTANT_ID.to_string()
}

impl AssistantIds {
    pub fn id_for(&self, kind: AssistantKind) -> &str {
        match kind {
            AssistantKind::Main => &self.main,
            AssistantKind::Analysis => &self.analysis,
            AssistantKind::PartyComparison => &self.party_comparison,
        }
    }
}

impl Default for AssistantIds {
    fn default() -> Self {
        Self {
            main: default_main(),
            analysis: default_analysis(),
            party_comparison: default_party_comparison(),
        }
    }
}

/// One request against an assistant.
#[derive(Debug, Clone, Copy)]
pub struct AssistantRequest<'a> {
    pub credential: &'a Credential,
    pub assistant_id: &'a str,
    /// Sent verbatim as the user turn.
    pub message: &'a str,
}

/// Status of a remote run.
///
/// `queued` and `in_progress` are the states the poll loop waits on. `cancelling` is
/// reported while the service winds a run down and is waited on as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    /// Any status string this client does not know yet, kept verbatim; treated as
    /// terminal.
    Unknown(String),
}

impl RunStatus {
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling
        )
    }

    /// Parses the wire name of a status.
    pub fn parse(status: &str) -> Self {
        match status {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "requires_action" => RunStatus::RequiresAction,
            "cancelling" => RunStatus::Cancelling,
            "cancelled" => RunStatus::Cancelled,
            "failed" => RunStatus::Failed,
            "completed" => RunStatus::Completed,
            "incomplete" => RunStatus::Incomplete,
            "expired" => RunStatus::Expired,
            other => RunStatus::Unknown(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown(raw) => raw.as_str(),
        }
    }
}

impl From<String> for RunStatus {
    fn from(status: String) -> Self {
        RunStatus::parse(&status)
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress event emitted while a request is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunProgress {
    ThreadCreated { thread_id: String },
    RunStarted { run_id: String },
    StatusChanged { status: RunStatus, elapsed_ms: u64 },
    ReplyReceived,
}

/// Client for a hosted assistant.
///
/// Implementations perform the whole remote sequence for one request and return the
/// assistant's reply text. They must not retry.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Sends `request.message` to the assistant and waits for its reply.
    ///
    /// # Errors
    ///
    /// - `WahlError::CredentialMissing` if the credential is unusable (no remote call is made)
    /// - `WahlError::RemoteCall` for transport, HTTP or decoding failures
    /// - `WahlError::RunNotCompleted` if the run ends in a state other than `completed`
    /// - `WahlError::RunTimedOut` if the run does not finish in time
    /// - `WahlError::Cancelled` if `cancel` fires first
    async fn ask(&self, request: AssistantRequest<'_>, cancel: &CancellationToken)
    -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_states() {
        assert!(RunStatus::Queued.is_pending());
        assert!(RunStatus::InProgress.is_pending());
        assert!(RunStatus::Cancelling.is_pending());
        for status in [
            RunStatus::Completed,
            RunStatus::Failed,
            RunStatus::Cancelled,
            RunStatus::Expired,
            RunStatus::Incomplete,
            RunStatus::RequiresAction,
            RunStatus::Unknown("brand_new_state".to_string()),
        ] {
            assert!(status.is_terminal(), "{status} should be terminal");
        }
    }

    #[test]
    fn test_status_deserialization() {
        let status: RunStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, RunStatus::InProgress);
        let status: RunStatus = serde_json::from_str("\"brand_new_state\"").unwrap();
        assert_eq!(status, RunStatus::Unknown("brand_new_state".to_string()));
        assert_eq!(status.to_string(), "brand_new_state");
        assert_eq!(
            serde_json::to_string(&RunStatus::RequiresAction).unwrap(),
            "\"requires_action\""
        );
    }

    #[test]
    fn test_assistant_ids_defaults_and_lookup() {
        let ids = AssistantIds::default();
        assert_eq!(ids.id_for(AssistantKind::Main), DEFAULT_MAIN_ASSISTANT_ID);
        assert_eq!(ids.id_for(AssistantKind::Analysis), DEFAULT_ANALYSIS_ASSISTANT_ID);
        assert_eq!(
            ids.id_for(AssistantKind::PartyComparison),
            DEFAULT_PARTY_COMPARISON_ASSISTANT_ID
        );
    }
}
