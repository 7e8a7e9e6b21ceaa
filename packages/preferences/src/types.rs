// ABOUTME: Type definitions for preferences
// ABOUTME: Plaintext snapshots for collaborators and masked views for the HTTP surface

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Replacement shown instead of a secure value
pub const SECRET_MASK: &str = "********";

/// A preference as exposed outside the process. Secure values are masked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceView {
    pub name: String,
    pub value: String,
    pub secure: bool,
}

/// Point-in-time plaintext copy of every preference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceSnapshot {
    values: BTreeMap<String, String>,
}

impl PreferenceSnapshot {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for PreferenceSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
