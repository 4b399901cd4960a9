//! Session domain model.
//!
//! This module contains the `Session` aggregate that holds everything one connected
//! client sees: credential, transcript, flattened chat history, the outputs of the two
//! secondary actions and the selected party.

use super::message::{ConversationMessage, MessageRole};
use crate::credential::Credential;
use crate::party::Party;
use crate::prompt::history_block;

/// Per-client conversational state.
///
/// Fields are private so that `transcript` and `chat_history_text` can only change
/// together: every completed exchange adds one user message, one assistant message and
/// one history block.
///
/// A session lives only in memory. It is passed explicitly into every use-case method
/// and never shared between clients.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    created_at: String,
    credential: Option<Credential>,
    transcript: Vec<ConversationMessage>,
    chat_history_text: String,
    analysis_output: Option<String>,
    comparison_output: Option<String>,
    selected_party: Party,
    welcome_shown: bool,
}

impl Session {
    /// Creates an empty session with a fresh UUID.
    pub fn new(default_party: Party) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), default_party)
    }

    pub fn with_id(id: impl Into<String>, default_party: Party) -> Self {
        Self {
            id: id.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            credential: None,
            transcript: Vec::new(),
            chat_history_text: String::new(),
            analysis_output: None,
            comparison_output: None,
            selected_party: default_party,
            welcome_shown: false,
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn transcript(&self) -> &[ConversationMessage] {
        &self.transcript
    }

    /// Transcript in display order (most recent first).
    pub fn transcript_newest_first(&self) -> impl Iterator<Item = &ConversationMessage> {
        self.transcript.iter().rev()
    }

    pub fn chat_history_text(&self) -> &str {
        &self.chat_history_text
    }

    pub fn analysis_output(&self) -> Option<&str> {
        self.analysis_output.as_deref()
    }

    pub fn comparison_output(&self) -> Option<&str> {
        self.comparison_output.as_deref()
    }

    pub fn selected_party(&self) -> &Party {
        &self.selected_party
    }

    pub fn welcome_shown(&self) -> bool {
        self.welcome_shown
    }

    /// Number of exchanges that received an assistant reply.
    pub fn completed_exchanges(&self) -> usize {
        self.transcript
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .count()
    }

    // ============================================================================
    // Mutators
    // ============================================================================

    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    /// Appends the user's turn before the remote call is made.
    ///
    /// The message stays in the transcript even if the call fails, so the unanswered
    /// question remains visible and can be sent again.
    pub fn push_user_message(&mut self, content: impl Into<String>) {
        self.transcript.push(ConversationMessage::user(content));
    }

    /// Records the assistant's reply to `user_message`.
    ///
    /// Appends the assistant message and the matching history block together and marks
    /// the welcome text as shown.
    pub fn complete_exchange(&mut self, user_message: &str, reply: impl Into<String>) {
        let reply = reply.into();
        self.chat_history_text
            .push_str(&history_block(user_message, &reply));
        self.transcript.push(ConversationMessage::assistant(reply));
        self.welcome_shown = true;
    }

    pub fn set_analysis_output(&mut self, output: impl Into<String>) {
        self.analysis_output = Some(output.into());
    }

    pub fn set_comparison_output(&mut self, output: impl Into<String>) {
        self.comparison_output = Some(output.into());
    }

    /// Callers must validate `party` against the catalog first.
    pub fn set_selected_party(&mut self, party: Party) {
        self.selected_party = party;
    }

    /// Blanks the conversation. Credential, party, id and creation time survive.
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.chat_history_text.clear();
        self.analysis_output = None;
        self.comparison_output = None;
        self.welcome_shown = false;
    }
}
