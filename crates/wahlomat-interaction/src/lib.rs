//! Remote assistant integration.
//!
//! `OpenAIAssistantClient` implements the `AssistantClient` port on top of the OpenAI
//! Assistants API: it opens a thread, posts the message, starts a run, polls it to a
//! terminal state and returns the newest assistant reply. The REST calls themselves sit
//! behind the `AssistantsApi` trait so the run loop can be driven by a scripted fake.

pub mod assistants_api;
pub mod http_assistants_api;
pub mod openai_assistant_client;

pub use assistants_api::{AssistantsApi, RunSnapshot};
pub use http_assistants_api::HttpAssistantsApi;
pub use openai_assistant_client::OpenAIAssistantClient;
