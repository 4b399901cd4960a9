//! OpenAIAssistantClient - `AssistantClient` backed by the OpenAI Assistants API.
//!
//! One `ask` call performs the full remote sequence:
//!
//! 1. create a thread
//! 2. post the message as a user turn
//! 3. start a run of the requested assistant
//! 4. poll the run every `poll_interval` while it is pending
//! 5. fetch the newest assistant reply
//!
//! The whole sequence is bounded by `run_timeout` and observes the caller's
//! `CancellationToken`. A run that is still pending when the request is abandoned is
//! cancelled remotely, and the thread is deleted once the request is over. Both cleanup
//! calls are best-effort: each is bounded by `cleanup_timeout` and only logged when it
//! fails or expires.

use crate::assistants_api::{AssistantsApi, RunSnapshot};
use crate::http_assistants_api::HttpAssistantsApi;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use wahlomat_core::assistant::{AssistantClient, AssistantRequest, RunProgress, RunStatus};
use wahlomat_core::config::{AppConfig, DEFAULT_POLL_INTERVAL_MS, DEFAULT_RUN_TIMEOUT_SECS};
use wahlomat_core::credential::Credential;
use wahlomat_core::error::{Result, WahlError};

/// Upper bound for each best-effort cleanup call (run cancel, thread deletion).
pub const DEFAULT_CLEANUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Why an in-flight step was abandoned.
enum Interrupt {
    Cancelled,
    TimedOut,
}

/// Assistant client that runs the thread/run/poll sequence.
#[derive(Clone)]
pub struct OpenAIAssistantClient {
    api: Arc<dyn AssistantsApi>,
    poll_interval: Duration,
    run_timeout: Duration,
    cleanup_timeout: Duration,
    progress: Option<UnboundedSender<RunProgress>>,
}

impl OpenAIAssistantClient {
    /// Creates a client over any `AssistantsApi` with default timings.
    pub fn new(api: Arc<dyn AssistantsApi>) -> Self {
        Self {
            api,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            run_timeout: Duration::from_secs(DEFAULT_RUN_TIMEOUT_SECS),
            cleanup_timeout: DEFAULT_CLEANUP_TIMEOUT,
            progress: None,
        }
    }

    /// Creates an HTTP-backed client from the application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(HttpAssistantsApi::new(config.base_url.clone())))
            .with_poll_interval(config.poll_interval())
            .with_run_timeout(config.run_timeout())
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_run_timeout(mut self, run_timeout: Duration) -> Self {
        self.run_timeout = run_timeout;
        self
    }

    pub fn with_cleanup_timeout(mut self, cleanup_timeout: Duration) -> Self {
        self.cleanup_timeout = cleanup_timeout;
        self
    }

    /// Installs a channel that receives a `RunProgress` event for every step and every
    /// observed status change.
    pub fn with_progress_sender(mut self, sender: UnboundedSender<RunProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    fn emit(&self, event: RunProgress) {
        if let Some(sender) = &self.progress {
            // Receiver gone means nobody is watching; that's fine
            let _ = sender.send(event);
        }
    }

    /// Awaits `fut` unless the token fires or the deadline passes first.
    async fn guarded<F: Future>(
        fut: F,
        cancel: &CancellationToken,
        deadline: Instant,
    ) -> std::result::Result<F::Output, Interrupt> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Interrupt::Cancelled),
            _ = tokio::time::sleep_until(deadline) => Err(Interrupt::TimedOut),
            out = fut => Ok(out),
        }
    }

    fn interrupt_error(&self, interrupt: Interrupt) -> WahlError {
        match interrupt {
            Interrupt::Cancelled => WahlError::Cancelled,
            Interrupt::TimedOut => WahlError::RunTimedOut {
                waited_secs: self.run_timeout.as_secs(),
            },
        }
    }

    /// Steps 2-5 on an already created thread.
    async fn converse(
        &self,
        request: AssistantRequest<'_>,
        thread_id: &str,
        cancel: &CancellationToken,
        deadline: Instant,
    ) -> Result<String> {
        let credential = request.credential;

        Self::guarded(
            self.api
                .add_user_message(credential, thread_id, request.message),
            cancel,
            deadline,
        )
        .await
        .map_err(|i| self.interrupt_error(i))??;

        let run = Self::guarded(
            self.api
                .create_run(credential, thread_id, request.assistant_id),
            cancel,
            deadline,
        )
        .await
        .map_err(|i| self.interrupt_error(i))??;

        tracing::info!(
            "[OpenAIAssistantClient] Run {} started for assistant {} on thread {}",
            run.id,
            request.assistant_id,
            thread_id
        );
        self.emit(RunProgress::RunStarted {
            run_id: run.id.clone(),
        });

        let run = self
            .wait_for_run(credential, thread_id, run, cancel, deadline)
            .await?;

        if run.status != RunStatus::Completed {
            tracing::warn!(
                "[OpenAIAssistantClient] Run {} ended with status {}",
                run.id,
                run.status
            );
            return Err(WahlError::RunNotCompleted {
                status: run.status.to_string(),
                reason: run.failure_reason,
            });
        }

        let reply = Self::guarded(
            self.api.latest_assistant_reply(credential, thread_id),
            cancel,
            deadline,
        )
        .await
        .map_err(|i| self.interrupt_error(i))??
        .ok_or_else(|| {
            WahlError::remote_call("Run completed but the thread holds no assistant text reply")
        })?;

        self.emit(RunProgress::ReplyReceived);
        Ok(reply)
    }

    /// Step 4: polls until the run leaves the pending states.
    async fn wait_for_run(
        &self,
        credential: &Credential,
        thread_id: &str,
        mut run: RunSnapshot,
        cancel: &CancellationToken,
        deadline: Instant,
    ) -> Result<RunSnapshot> {
        let started = Instant::now();
        let mut last_status: Option<RunStatus> = None;

        loop {
            if last_status.as_ref() != Some(&run.status) {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                tracing::debug!(
                    "[OpenAIAssistantClient] Run {} is {} after {}ms",
                    run.id,
                    run.status,
                    elapsed_ms
                );
                self.emit(RunProgress::StatusChanged {
                    status: run.status.clone(),
                    elapsed_ms,
                });
                last_status = Some(run.status.clone());
            }

            if run.status.is_terminal() {
                return Ok(run);
            }

            let step = async {
                tokio::time::sleep(self.poll_interval).await;
                self.api.retrieve_run(credential, thread_id, &run.id).await
            };

            match Self::guarded(step, cancel, deadline).await {
                Ok(next) => run = next?,
                Err(interrupt) => {
                    self.abort_run(credential, thread_id, &run.id).await;
                    return Err(self.interrupt_error(interrupt));
                }
            }
        }
    }

    async fn abort_run(&self, credential: &Credential, thread_id: &str, run_id: &str) {
        tracing::info!(
            "[OpenAIAssistantClient] Cancelling run {} on thread {}",
            run_id,
            thread_id
        );
        let cancel_call = self.api.cancel_run(credential, thread_id, run_id);
        match tokio::time::timeout(self.cleanup_timeout, cancel_call).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(
                "[OpenAIAssistantClient] Failed to cancel run {}: {}",
                run_id,
                e
            ),
            Err(_) => tracing::warn!(
                "[OpenAIAssistantClient] Cancelling run {} did not finish within {:?}",
                run_id,
                self.cleanup_timeout
            ),
        }
    }

    async fn release_thread(&self, credential: &Credential, thread_id: &str) {
        let delete_call = self.api.delete_thread(credential, thread_id);
        match tokio::time::timeout(self.cleanup_timeout, delete_call).await {
            Ok(Ok(())) => tracing::debug!("[OpenAIAssistantClient] Deleted thread {}", thread_id),
            Ok(Err(e)) => tracing::warn!(
                "[OpenAIAssistantClient] Failed to delete thread {}: {}",
                thread_id,
                e
            ),
            Err(_) => tracing::warn!(
                "[OpenAIAssistantClient] Deleting thread {} did not finish within {:?}",
                thread_id,
                self.cleanup_timeout
            ),
        }
    }
}

#[async_trait]
impl AssistantClient for OpenAIAssistantClient {
    async fn ask(
        &self,
        request: AssistantRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<String> {
        if request.credential.expose().is_empty() {
            return Err(WahlError::CredentialMissing);
        }
        if cancel.is_cancelled() {
            return Err(WahlError::Cancelled);
        }

        let deadline = Instant::now() + self.run_timeout;

        let thread_id = Self::guarded(
            self.api.create_thread(request.credential),
            cancel,
            deadline,
        )
        .await
        .map_err(|i| self.interrupt_error(i))??;

        tracing::debug!("[OpenAIAssistantClient] Created thread {}", thread_id);
        self.emit(RunProgress::ThreadCreated {
            thread_id: thread_id.clone(),
        });

        let result = self.converse(request, &thread_id, cancel, deadline).await;
        self.release_thread(request.credential, &thread_id).await;
        result
    }
}
