//! Party catalog used by the comparison action.
//!
//! The list of selectable parties comes from configuration and is validated when the
//! catalog is built, so the session boundary can reject unknown names.

use crate::error::{Result, WahlError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Parties offered by default, in display order.
pub const DEFAULT_PARTIES: [&str; 7] = [
    "CDU/CSU",
    "AFD",
    "SPD",
    "Die Grünen",
    "FDP",
    "Die Linken",
    "BSW",
];

/// Party selected when a session starts.
pub const DEFAULT_PARTY: &str = "CDU/CSU";

/// A party name that has been validated against a [`PartyCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Party(String);

impl Party {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed, ordered set of parties a session may select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyCatalog {
    parties: Vec<Party>,
    default: Party,
}

impl PartyCatalog {
    /// Builds a catalog from configured names.
    ///
    /// # Errors
    ///
    /// Returns `WahlError::Config` if the list is empty, contains blank or duplicate
    /// names, or does not contain `default`.
    pub fn new<I, S>(names: I, default: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut parties = Vec::new();

        for name in names {
            let name: String = name.into();
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(WahlError::config("party names must not be blank"));
            }
            if !seen.insert(name.clone()) {
                return Err(WahlError::config(format!("duplicate party name '{name}'")));
            }
            parties.push(Party(name));
        }

        if parties.is_empty() {
            return Err(WahlError::config("party list must not be empty"));
        }

        let default = parties
            .iter()
            .find(|party| party.name() == default.trim())
            .cloned()
            .ok_or_else(|| {
                WahlError::config(format!("default party '{default}' is not in the party list"))
            })?;

        Ok(Self { parties, default })
    }

    /// Looks up a party by exact (trimmed) name.
    ///
    /// # Errors
    ///
    /// Returns `WahlError::InvalidParty` for names outside the catalog.
    pub fn resolve(&self, name: &str) -> Result<Party> {
        let name = name.trim();
        self.parties
            .iter()
            .find(|party| party.name() == name)
            .cloned()
            .ok_or_else(|| WahlError::InvalidParty(name.to_string()))
    }

    pub fn default_party(&self) -> &Party {
        &self.default
    }

    pub fn parties(&self) -> &[Party] {
        &self.parties
    }
}

impl Default for PartyCatalog {
    fn default() -> Self {
        Self {
            parties: DEFAULT_PARTIES
                .iter()
                .map(|name| Party((*name).to_string()))
                .collect(),
            default: Party(DEFAULT_PARTY.to_string()),
        }
    }
}
