//! Member entity and its write models.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::testing::{TableError, TableRow};
use crate::time::parse_timestamp;

/// A persisted member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Business identifier.
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// Age in years.
    pub age: Option<i32>,
    /// Store-assigned, monotonically increasing sequence number.
    pub sequence_id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<FixedOffset>,
    /// Caller that created the record.
    pub created_by: Option<String>,
    /// Last modification timestamp.
    pub changed_at: Option<DateTime<FixedOffset>>,
    /// Caller that last modified the record.
    pub changed_by: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

/// Payload for creating a member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    /// Identifier; generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Age in years.
    #[serde(default)]
    pub age: Option<i32>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Payload for updating a member. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New age.
    #[serde(default)]
    pub age: Option<i32>,
    /// New email.
    #[serde(default)]
    pub email: Option<String>,
}

impl Member {
    /// Builds a member from named table cells.
    ///
    /// `Id` is required. `CreatedAt` falls back to `default_created_at`.
    /// `SequenceId` is ignored because the store assigns it.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing id, an unknown column or an unparsable cell.
    pub fn from_cells<'a>(
        cells: impl IntoIterator<Item = (&'a str, &'a str)>,
        default_created_at: DateTime<FixedOffset>,
    ) -> DomainResult<Self> {
        let mut member = Self {
            id: String::new(),
            name: None,
            age: None,
            sequence_id: 0,
            created_at: default_created_at,
            created_by: None,
            changed_at: None,
            changed_by: None,
            email: None,
        };

        for (column, value) in cells {
            let value = value.trim();
            match Column::parse(column) {
                Some(Column::Id) => member.id = value.to_string(),
                Some(Column::Name) => member.name = non_empty(value),
                Some(Column::Age) => {
                    member.age = non_empty(value)
                        .map(|v| v.parse::<i32>())
                        .transpose()
                        .map_err(|e| DomainError::InvalidTable(format!("Age '{value}': {e}")))?;
                }
                Some(Column::SequenceId) => {}
                Some(Column::CreatedAt) => {
                    if !value.is_empty() {
                        member.created_at = parse_timestamp(value)?;
                    }
                }
                Some(Column::CreatedBy) => member.created_by = non_empty(value),
                Some(Column::ChangedAt) => {
                    member.changed_at = non_empty(value)
                        .map(|v| parse_timestamp(&v))
                        .transpose()?;
                }
                Some(Column::ChangedBy) => member.changed_by = non_empty(value),
                Some(Column::Email) => member.email = non_empty(value),
                None => {
                    return Err(DomainError::InvalidTable(format!(
                        "unknown Member column '{column}'"
                    )));
                }
            }
        }

        if member.id.is_empty() {
            return Err(DomainError::InvalidIdentifier(
                "Member row requires an Id".to_string(),
            ));
        }

        Ok(member)
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Member columns addressable from data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    Name,
    Age,
    SequenceId,
    CreatedAt,
    CreatedBy,
    ChangedAt,
    ChangedBy,
    Email,
}

impl Column {
    /// Accepts `CreatedAt`, `createdAt` and `created_at` alike.
    fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "age" => Some(Self::Age),
            "sequenceid" => Some(Self::SequenceId),
            "createdat" => Some(Self::CreatedAt),
            "createdby" => Some(Self::CreatedBy),
            "changedat" => Some(Self::ChangedAt),
            "changedby" => Some(Self::ChangedBy),
            "email" => Some(Self::Email),
            _ => None,
        }
    }
}

fn text_matches(actual: Option<&str>, expected: &str) -> bool {
    actual.unwrap_or_default() == expected
}

fn number_matches(column: &str, actual: Option<i64>, expected: &str) -> Result<bool, TableError> {
    if expected.is_empty() {
        return Ok(actual.is_none());
    }
    let expected = expected
        .parse::<i64>()
        .map_err(|e| TableError::invalid_cell(column, expected, e))?;
    Ok(actual == Some(expected))
}

fn timestamp_matches(
    column: &str,
    actual: Option<&DateTime<FixedOffset>>,
    expected: &str,
) -> Result<bool, TableError> {
    if expected.is_empty() {
        return Ok(actual.is_none());
    }
    let expected =
        parse_timestamp(expected).map_err(|e| TableError::invalid_cell(column, expected, e))?;
    Ok(actual == Some(&expected))
}

impl TableRow for Member {
    fn cell_matches(&self, column: &str, expected: &str) -> Result<bool, TableError> {
        let expected = expected.trim();
        match Column::parse(column) {
            Some(Column::Id) => Ok(self.id == expected),
            Some(Column::Name) => Ok(text_matches(self.name.as_deref(), expected)),
            Some(Column::Age) => number_matches(column, self.age.map(i64::from), expected),
            Some(Column::SequenceId) => number_matches(column, Some(self.sequence_id), expected),
            Some(Column::CreatedAt) => timestamp_matches(column, Some(&self.created_at), expected),
            Some(Column::CreatedBy) => Ok(text_matches(self.created_by.as_deref(), expected)),
            Some(Column::ChangedAt) => timestamp_matches(column, self.changed_at.as_ref(), expected),
            Some(Column::ChangedBy) => Ok(text_matches(self.changed_by.as_deref(), expected)),
            Some(Column::Email) => Ok(text_matches(self.email.as_deref(), expected)),
            None => Err(TableError::UnknownColumn(column.to_string())),
        }
    }

    fn describe(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("Member {{ id: {} }}", self.id))
    }
}
