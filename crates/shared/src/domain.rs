use std::fmt;

use serde::{Deserialize, Serialize};

/// Absolute path of a folder picked by the user.
///
/// Existence and permissions are the copy engine's concern; nothing here
/// checks them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderPath(String);

impl FolderPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FolderPath {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for FolderPath {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderRole {
    Source,
    Destination,
}

impl FolderRole {
    pub const ALL: [FolderRole; 2] = [FolderRole::Source, FolderRole::Destination];

    /// Key under which the selection is persisted.
    pub fn storage_key(self) -> &'static str {
        match self {
            FolderRole::Source => "source",
            FolderRole::Destination => "destination",
        }
    }
}

impl fmt::Display for FolderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// Absolute counts reported by the engine for the running session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressCounters {
    pub copied: u64,
    pub skipped: u64,
}

impl ProgressCounters {
    pub fn new(copied: u64, skipped: u64) -> Self {
        Self { copied, skipped }
    }
}
