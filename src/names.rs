//! Symbol to display-name lookup
//!
//! Built by the caller and passed by reference to whatever renders the report.
//! Classification and ranking never read it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{PatternError, Result};

/// Read-only symbol -> display name table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetNames(HashMap<String, String>);

impl AssetNames {
    pub fn new(names: HashMap<String, String>) -> Self {
        Self(names)
    }

    /// Parse a flat TOML table: `ACME = "Acme Corp"`
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| PatternError::InvalidConfig(e.to_string()))
    }

    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.0.get(symbol).map(String::as_str)
    }

    /// Display name, or the symbol itself when the table has no entry
    pub fn display_name<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.get(symbol).unwrap_or(symbol)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AssetNames {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
