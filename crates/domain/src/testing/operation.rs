//! The comparison operations available to path assertions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The operation tag is not one of the known comparisons.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown assertion operation '{0}'")]
pub struct UnknownOperation(pub String);

/// How the value selected by a path is compared against the expected text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionOperation {
    /// Text equality; an absent or `null` node reads as `""`.
    StringEquals,
    /// Integer equality.
    NumberEquals,
    /// Boolean equality.
    BoolEquals,
    /// Structural JSON equality, key order ignored.
    JsonEquals,
    /// Timestamp equality, instant and offset.
    DateTimeEquals,
}

impl AssertionOperation {
    /// Returns all operations.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::StringEquals,
            Self::NumberEquals,
            Self::BoolEquals,
            Self::JsonEquals,
            Self::DateTimeEquals,
        ]
    }

    /// Returns the tag used in feature files.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::StringEquals => "字串等於",
            Self::NumberEquals => "數值等於",
            Self::BoolEquals => "布林值等於",
            Self::JsonEquals => "Json等於",
            Self::DateTimeEquals => "時間等於",
        }
    }

    /// Returns the English alias.
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Self::StringEquals => "string equals",
            Self::NumberEquals => "number equals",
            Self::BoolEquals => "bool equals",
            Self::JsonEquals => "json equals",
            Self::DateTimeEquals => "datetime equals",
        }
    }
}

impl fmt::Display for AssertionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for AssertionOperation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|op| {
                op.tag().eq_ignore_ascii_case(trimmed) || op.alias().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}
