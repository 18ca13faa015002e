use crate::error::AppError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Owning board. Nested task documents on disk omit it; the store fills
    /// it in from the enclosing board on load.
    #[serde(default)]
    pub board_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub user_id: String,
    pub status: TaskStatus,
    pub creation_time: String,
}

/// Task progress. New statuses are always one of the three named variants;
/// `Other` keeps a stored value that does not fold onto any of them, so
/// older files load intact. An `Other` task never counts as complete.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Open,
    InProgress,
    Complete,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Complete => "COMPLETE",
            Self::Other(raw) => raw,
        }
    }

    /// Reads a stored value, folding loose spellings and keeping anything
    /// unrecognised verbatim.
    pub fn from_stored(raw: String) -> Self {
        raw.parse().unwrap_or(Self::Other(raw))
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from_stored)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    /// Accepts the stored spelling in any case, with `-` or space in place of `_`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|ch| match ch {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        match normalized.as_str() {
            "OPEN" => Ok(Self::Open),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETE" => Ok(Self::Complete),
            _ => Err(AppError::validation(format!(
                "unknown task status '{}' (expected OPEN, IN_PROGRESS or COMPLETE)",
                raw.trim()
            ))),
        }
    }
}
