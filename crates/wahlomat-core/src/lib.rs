//! Domain layer for the Wahl-O-Mat agent.
//!
//! Holds the session aggregate, the assistant client port, the party catalog and the
//! configuration model. Nothing in here performs I/O.

pub mod assistant;
pub mod config;
pub mod credential;
pub mod error;
pub mod party;
pub mod prompt;
pub mod session;

// Re-export common error type
pub use error::{Result, WahlError};
