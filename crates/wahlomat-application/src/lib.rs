//! Application layer for the Wahl-O-Mat agent.
//!
//! This crate implements the user-triggered session transitions on top of the domain
//! types and the `AssistantClient` port.

pub mod session;
pub mod session_usecase;

pub use session::SessionRegistry;
pub use session_usecase::SessionUseCase;
