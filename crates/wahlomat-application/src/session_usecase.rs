//! Session use case implementation.
//!
//! This module provides the `SessionUseCase` which implements every user-triggered
//! transition of a `Session`: setting the credential, sending a chat message, the two
//! secondary analyses, selecting a party and clearing the chat.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wahlomat_core::assistant::{AssistantClient, AssistantIds, AssistantKind, AssistantRequest};
use wahlomat_core::config::AppConfig;
use wahlomat_core::credential::Credential;
use wahlomat_core::error::{Result, WahlError};
use wahlomat_core::party::PartyCatalog;
use wahlomat_core::prompt::party_comparison_prompt;
use wahlomat_core::session::Session;

/// Use case for driving one session.
///
/// `SessionUseCase` holds no session state itself. Every operation receives the
/// caller's `Session` by mutable reference, so one instance can serve any number of
/// independent sessions.
///
/// # Failure semantics
///
/// No error is fatal. After any failure the session remains usable; only the output the
/// failed action would have produced is left untouched.
pub struct SessionUseCase {
    /// Client for the hosted assistants
    assistant_client: Arc<dyn AssistantClient>,
    /// Assistant IDs for the three behavior profiles
    assistant_ids: AssistantIds,
    /// Parties a session may select
    party_catalog: PartyCatalog,
}

impl SessionUseCase {
    /// Creates a new `SessionUseCase` instance.
    ///
    /// # Arguments
    ///
    /// * `assistant_client` - Client used for every remote call
    /// * `assistant_ids` - IDs of the main, analysis and comparison assistants
    /// * `party_catalog` - Parties offered for comparison
    pub fn new(
        assistant_client: Arc<dyn AssistantClient>,
        assistant_ids: AssistantIds,
        party_catalog: PartyCatalog,
    ) -> Self {
        Self {
            assistant_client,
            assistant_ids,
            party_catalog,
        }
    }

    /// Creates a use case from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns `WahlError::Config` if the configured party list is invalid.
    pub fn from_config(
        assistant_client: Arc<dyn AssistantClient>,
        config: &AppConfig,
    ) -> Result<Self> {
        Ok(Self::new(
            assistant_client,
            config.assistants.clone(),
            config.party_catalog()?,
        ))
    }

    pub fn party_catalog(&self) -> &PartyCatalog {
        &self.party_catalog
    }

    /// Creates an empty session with the catalog's default party selected.
    pub fn new_session(&self) -> Session {
        Session::new(self.party_catalog.default_party().clone())
    }

    /// Stores the API key for the session.
    ///
    /// The key is not validated locally; a wrong key surfaces on the first remote call.
    ///
    /// # Errors
    ///
    /// Returns `WahlError::CredentialMissing` for blank input; the previous key is kept.
    pub fn set_credential(&self, session: &mut Session, secret: &str) -> Result<()> {
        let credential = Credential::new(secret)?;
        session.set_credential(credential);
        tracing::info!(
            "[SessionUseCase] Credential set for session {}",
            session.id()
        );
        Ok(())
    }

    /// Sends a chat message to the main assistant.
    ///
    /// The user turn is appended before the remote call. On success the reply is
    /// appended, the history block is recorded and the welcome text is marked as shown.
    /// On failure the user turn stays in the transcript without an answer.
    ///
    /// # Returns
    ///
    /// - `Ok(None)`: `text` was blank; nothing happened
    /// - `Ok(Some(reply))`: the assistant's reply
    ///
    /// # Errors
    ///
    /// - `WahlError::CredentialMissing` if no key is set (transcript unchanged)
    /// - any error of the assistant client
    pub async fn send_message(
        &self,
        session: &mut Session,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let credential = session
            .credential()
            .cloned()
            .ok_or(WahlError::CredentialMissing)?;

        session.push_user_message(text);

        let reply = self
            .ask(&credential, AssistantKind::Main, text, cancel)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    "[SessionUseCase] Message in session {} left unanswered: {}",
                    session.id(),
                    e
                );
            })?;

        session.complete_exchange(text, reply.clone());
        tracing::info!(
            "[SessionUseCase] Session {} completed exchange #{}",
            session.id(),
            session.completed_exchanges()
        );
        Ok(Some(reply))
    }

    /// Classifies the whole chat history against the party platforms.
    ///
    /// The history is forwarded as-is, even when empty. The transcript is never touched.
    ///
    /// # Errors
    ///
    /// Returns the failure and leaves the previous analysis output in place.
    pub async fn request_analysis(
        &self,
        session: &mut Session,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let credential = session
            .credential()
            .cloned()
            .ok_or(WahlError::CredentialMissing)?;

        let history = session.chat_history_text().to_string();
        let output = self
            .ask(&credential, AssistantKind::Analysis, &history, cancel)
            .await?;

        session.set_analysis_output(output.clone());
        Ok(output)
    }

    /// Compares the chat history with the selected party's platform.
    ///
    /// # Errors
    ///
    /// Returns the failure and leaves the previous comparison output in place.
    pub async fn request_party_comparison(
        &self,
        session: &mut Session,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let credential = session
            .credential()
            .cloned()
            .ok_or(WahlError::CredentialMissing)?;

        let prompt = party_comparison_prompt(session.chat_history_text(), session.selected_party());
        let output = self
            .ask(&credential, AssistantKind::PartyComparison, &prompt, cancel)
            .await?;

        session.set_comparison_output(output.clone());
        Ok(output)
    }

    /// Selects the party used by the comparison.
    ///
    /// # Errors
    ///
    /// Returns `WahlError::InvalidParty` for names outside the catalog; the selection is
    /// left unchanged.
    pub fn select_party(&self, session: &mut Session, name: &str) -> Result<()> {
        let party = self.party_catalog.resolve(name)?;
        tracing::debug!(
            "[SessionUseCase] Session {} selected party {}",
            session.id(),
            party
        );
        session.set_selected_party(party);
        Ok(())
    }

    /// Clears transcript, history and outputs. Credential and party are kept.
    pub fn clear_session(&self, session: &mut Session) {
        session.clear();
        tracing::info!("[SessionUseCase] Session {} cleared", session.id());
    }

    async fn ask(
        &self,
        credential: &Credential,
        kind: AssistantKind,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let assistant_id = self.assistant_ids.id_for(kind);
        tracing::info!(
            "[SessionUseCase] Asking {} assistant ({} chars)",
            kind,
            message.chars().count()
        );

        let request = AssistantRequest {
            credential,
            assistant_id,
            message,
        };
        self.assistant_client.ask(request, cancel).await
    }
}
