//! The subset of the Assistants REST API the client needs.

use async_trait::async_trait;
use wahlomat_core::assistant::RunStatus;
use wahlomat_core::credential::Credential;
use wahlomat_core::error::Result;

/// State of a run as last reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSnapshot {
    pub id: String,
    pub status: RunStatus,
    /// `last_error.message` or `incomplete_details.reason`, whichever the service set.
    pub failure_reason: Option<String>,
}

/// Raw calls against the Assistants API.
///
/// Each method is a single request; none of them retries.
#[async_trait]
pub trait AssistantsApi: Send + Sync {
    /// Opens a new thread and returns its id.
    async fn create_thread(&self, credential: &Credential) -> Result<String>;

    /// Adds `content` to the thread as a user turn.
    async fn add_user_message(
        &self,
        credential: &Credential,
        thread_id: &str,
        content: &str,
    ) -> Result<()>;

    /// Starts `assistant_id` on the thread.
    async fn create_run(
        &self,
        credential: &Credential,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<RunSnapshot>;

    async fn retrieve_run(
        &self,
        credential: &Credential,
        thread_id: &str,
        run_id: &str,
    ) -> Result<RunSnapshot>;

    async fn cancel_run(&self, credential: &Credential, thread_id: &str, run_id: &str)
    -> Result<()>;

    /// Text of the most recent assistant message on the thread, if any.
    async fn latest_assistant_reply(
        &self,
        credential: &Credential,
        thread_id: &str,
    ) -> Result<Option<String>>;

    async fn delete_thread(&self, credential: &Credential, thread_id: &str) -> Result<()>;
}
