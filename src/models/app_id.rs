use serde::{Deserialize, Serialize};
use std::fmt;

/// Case-normalized application token (an Android package name, an X11
/// `WM_CLASS`, ...).
///
/// Normalization to lowercase happens once, here, so every comparison
/// downstream is a plain byte comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AppIdentifier(String);

impl AppIdentifier {
    pub fn new(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substring test used by both keyword matching and self-exclusion.
    pub fn contains(&self, needle: &AppIdentifier) -> bool {
        self.0.contains(needle.as_str())
    }
}

impl From<String> for AppIdentifier {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for AppIdentifier {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<AppIdentifier> for String {
    fn from(id: AppIdentifier) -> Self {
        id.0
    }
}

impl fmt::Display for AppIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
