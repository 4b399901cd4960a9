//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: the per-client `Session` aggregate and its invariant-preserving mutators
//! - `message`: transcript message types (`MessageRole`, `ConversationMessage`)

mod message;
mod model;

pub use message::{ConversationMessage, MessageRole};
pub use model::Session;
