//! API credential held for the lifetime of a session.
//!
//! The key is supplied by the user at runtime and never written to disk.
//! `Debug` and `Display` are redacted so the secret cannot leak through logs.

use crate::error::{Result, WahlError};
use std::fmt;

/// An OpenAI API key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Creates a credential from user input.
    ///
    /// Surrounding whitespace is trimmed. No format validation happens here; an invalid
    /// key is only discovered by the first remote call.
    ///
    /// # Errors
    ///
    /// Returns `WahlError::CredentialMissing` if the input is empty after trimming.
    pub fn new(secret: impl AsRef<str>) -> Result<Self> {
        let trimmed = secret.as_ref().trim();
        if trimmed.is_empty() {
            return Err(WahlError::CredentialMissing);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the raw secret for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}
