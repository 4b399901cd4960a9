//! HttpAssistantsApi - Direct REST implementation of the OpenAI Assistants API (v2).

use crate::assistants_api::{AssistantsApi, RunSnapshot};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wahlomat_core::assistant::RunStatus;
use wahlomat_core::config::DEFAULT_BASE_URL;
use wahlomat_core::credential::Credential;
use wahlomat_core::error::{Result, WahlError};

const ASSISTANTS_BETA_HEADER: &str = "assistants=v2";
/// Upper bound for a single HTTP request; the run itself is bounded by the client.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// How many messages to look at when searching for the newest assistant reply.
const MESSAGE_PAGE_SIZE: &str = "20";

/// Talks to the Assistants endpoints over HTTPS.
#[derive(Clone)]
pub struct HttpAssistantsApi {
    client: Client,
    base_url: String,
}

impl HttpAssistantsApi {
    /// Creates an API handle for the given base URL (e.g. `https://api.openai.com/v1`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        credential: &Credential,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .request(method, self.url(path))
            .bearer_auth(credential.expose())
            .header("OpenAI-Beta", ASSISTANTS_BETA_HEADER)
            .timeout(REQUEST_TIMEOUT);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| WahlError::remote_call(format!("OpenAI API request failed: {err}")))?;

        let status = response.status();
        let body_text = response.text().await.map_err(|err| {
            WahlError::remote_call(format!("Failed to read OpenAI response body: {err}"))
        })?;

        if !status.is_success() {
            return Err(map_http_error(status, &body_text));
        }

        serde_json::from_str(&body_text).map_err(|err| {
            WahlError::remote_call(format!("Failed to parse OpenAI response: {err}"))
        })
    }
}

impl Default for HttpAssistantsApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl AssistantsApi for HttpAssistantsApi {
    async fn create_thread(&self, credential: &Credential) -> Result<String> {
        let thread: ObjectId = self
            .send(
                Method::POST,
                "threads",
                credential,
                &[],
                Some(&serde_json::json!({})),
            )
            .await?;
        Ok(thread.id)
    }

    async fn add_user_message(
        &self,
        credential: &Credential,
        thread_id: &str,
        content: &str,
    ) -> Result<()> {
        let body = CreateMessageRequest {
            role: "user",
            content,
        };
        let _: ObjectId = self
            .send(
                Method::POST,
                &format!("threads/{thread_id}/messages"),
                credential,
                &[],
                Some(&body),
            )
            .await?;
        Ok(())
    }

    async fn create_run(
        &self,
        credential: &Credential,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<RunSnapshot> {
        let body = CreateRunRequest { assistant_id };
        let run: RunObject = self
            .send(
                Method::POST,
                &format!("threads/{thread_id}/runs"),
                credential,
                &[],
                Some(&body),
            )
            .await?;
        Ok(run.into())
    }

    async fn retrieve_run(
        &self,
        credential: &Credential,
        thread_id: &str,
        run_id: &str,
    ) -> Result<RunSnapshot> {
        let run: RunObject = self
            .send::<(), _>(
                Method::GET,
                &format!("threads/{thread_id}/runs/{run_id}"),
                credential,
                &[],
                None,
            )
            .await?;
        Ok(run.into())
    }

    async fn cancel_run(
        &self,
        credential: &Credential,
        thread_id: &str,
        run_id: &str,
    ) -> Result<()> {
        let _: RunObject = self
            .send(
                Method::POST,
                &format!("threads/{thread_id}/runs/{run_id}/cancel"),
                credential,
                &[],
                Some(&serde_json::json!({})),
            )
            .await?;
        Ok(())
    }

    async fn latest_assistant_reply(
        &self,
        credential: &Credential,
        thread_id: &str,
    ) -> Result<Option<String>> {
        let list: MessageList = self
            .send::<(), _>(
                Method::GET,
                &format!("threads/{thread_id}/messages"),
                credential,
                &[("order", "desc"), ("limit", MESSAGE_PAGE_SIZE)],
                None,
            )
            .await?;
        Ok(extract_latest_assistant_reply(list))
    }

    async fn delete_thread(&self, credential: &Credential, thread_id: &str) -> Result<()> {
        let deleted: DeletionStatus = self
            .send::<(), _>(
                Method::DELETE,
                &format!("threads/{thread_id}"),
                credential,
                &[],
                None,
            )
            .await?;

        if deleted.deleted {
            Ok(())
        } else {
            Err(WahlError::remote_call(format!(
                "OpenAI API refused to delete thread {thread_id}"
            )))
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
}

#[derive(Deserialize)]
struct ObjectId {
    id: String,
}

#[derive(Deserialize)]
struct RunObject {
    id: String,
    status: RunStatus,
    #[serde(default)]
    last_error: Option<RunError>,
    #[serde(default)]
    incomplete_details: Option<IncompleteDetails>,
}

#[derive(Deserialize)]
struct RunError {
    #[allow(dead_code)]
    code: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct IncompleteDetails {
    reason: Option<String>,
}

impl From<RunObject> for RunSnapshot {
    fn from(run: RunObject) -> Self {
        let failure_reason = run
            .last_error
            .and_then(|err| err.message)
            .or_else(|| run.incomplete_details.and_then(|d| d.reason));
        RunSnapshot {
            id: run.id,
            status: run.status,
            failure_reason,
        }
    }
}

#[derive(Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

#[derive(Deserialize)]
struct ThreadMessage {
    role: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text {
        text: TextContent,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct TextContent {
    value: String,
}

#[derive(Deserialize)]
struct DeletionStatus {
    deleted: bool,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[allow(dead_code)]
    r#type: Option<String>,
    #[allow(dead_code)]
    code: Option<String>,
}

/// Picks the newest assistant message (the list is ordered newest first) and joins its
/// text parts. Image or file parts are skipped.
fn extract_latest_assistant_reply(list: MessageList) -> Option<String> {
    list.data
        .into_iter()
        .filter(|message| message.role == "assistant")
        .find_map(|message| {
            let texts: Vec<String> = message
                .content
                .into_iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.value),
                    ContentPart::Other => None,
                })
                .collect();
            if texts.is_empty() {
                None
            } else {
                Some(texts.join("\n"))
            }
        })
}

fn map_http_error(status: StatusCode, body: &str) -> WahlError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("empty error body")
                    .to_string()
            } else {
                body.to_string()
            }
        });

    WahlError::remote_status(status.as_u16(), message)
}
