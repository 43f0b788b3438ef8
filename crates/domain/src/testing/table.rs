//! Gherkin data tables and unordered row comparison.

use std::fmt::Display;

use thiserror::Error;

use crate::error::{DomainError, DomainResult};

/// Errors raised while matching rows against a table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The table names a column the row type does not have.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// A cell cannot be read as the column requires.
    #[error("column '{column}' cannot read '{value}': {reason}")]
    InvalidCell {
        /// Column header.
        column: String,
        /// Raw cell text.
        value: String,
        /// Parse failure.
        reason: String,
    },
}

impl TableError {
    /// Creates an [`TableError::InvalidCell`] from a parse failure.
    pub fn invalid_cell(column: &str, value: &str, err: impl Display) -> Self {
        Self::InvalidCell {
            column: column.to_string(),
            value: value.to_string(),
            reason: err.to_string(),
        }
    }
}

/// A row that can be compared cell by cell against a table row.
pub trait TableRow {
    /// Whether the value under `column` equals the expected cell text.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown columns or unparsable expected cells.
    fn cell_matches(&self, column: &str, expected: &str) -> Result<bool, TableError>;

    /// Human-readable rendering used in failure messages.
    fn describe(&self) -> String;
}

/// A data table whose first row is the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Creates a table from raw rows; the first row becomes the header.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTable`] if a data row is wider or
    /// narrower than the header.
    pub fn from_rows(raw: Vec<Vec<String>>) -> DomainResult<Self> {
        let mut iter = raw.into_iter();
        let Some(header) = iter.next() else {
            return Ok(Self::default());
        };
        let header: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();

        let mut rows = Vec::new();
        for (index, row) in iter.enumerate() {
            if row.len() != header.len() {
                return Err(DomainError::InvalidTable(format!(
                    "row {} has {} cells, header has {}",
                    index + 1,
                    row.len(),
                    header.len()
                )));
            }
            rows.push(row);
        }

        Ok(Self { header, rows })
    }

    /// Column names.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Number of data rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no data rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Data rows as `(column, value)` pairs.
    pub fn rows(&self) -> impl Iterator<Item = Vec<(&str, &str)>> + '_ {
        self.rows.iter().map(|row| {
            self.header
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
                .collect()
        })
    }
}

/// Checks that `actual` holds exactly the rows of `expected`, in any order.
///
/// Each expected row consumes one matching actual row, so duplicates must
/// appear the same number of times on both sides.
///
/// # Errors
///
/// Returns a [`TableError`] if a cell cannot be compared. The `Ok(Err(..))`
/// case carries a description of the difference.
pub fn compare_rows<R: TableRow>(
    expected: &DataTable,
    actual: &[R],
) -> Result<Result<(), String>, TableError> {
    let mut unmatched: Vec<&R> = actual.iter().collect();
    let mut missing = Vec::new();

    for row in expected.rows() {
        let mut found = None;
        for (index, candidate) in unmatched.iter().enumerate() {
            if row_matches(*candidate, &row)? {
                found = Some(index);
                break;
            }
        }
        match found {
            Some(index) => {
                unmatched.swap_remove(index);
            }
            None => missing.push(render_row(&row)),
        }
    }

    if missing.is_empty() && unmatched.is_empty() {
        return Ok(Ok(()));
    }

    let mut report = format!(
        "expected {} rows, found {}",
        expected.len(),
        actual.len()
    );
    for row in &missing {
        report.push_str("\n  missing: ");
        report.push_str(row);
    }
    for row in &unmatched {
        report.push_str("\n  unexpected: ");
        report.push_str(&row.describe());
    }
    Ok(Err(report))
}

fn row_matches<R: TableRow>(candidate: &R, row: &[(&str, &str)]) -> Result<bool, TableError> {
    for (column, value) in row {
        if !candidate.cell_matches(column, value)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn render_row(row: &[(&str, &str)]) -> String {
    let cells: Vec<String> = row.iter().map(|(c, v)| format!("{c}={v}")).collect();
    format!("{{{}}}", cells.join(", "))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Pair {
        key: &'static str,
        value: i64,
    }

    impl TableRow for Pair {
        fn cell_matches(&self, column: &str, expected: &str) -> Result<bool, TableError> {
            match column {
                "Key" => Ok(self.key == expected),
                "Value" => expected
                    .parse::<i64>()
                    .map(|v| v == self.value)
                    .map_err(|e| TableError::invalid_cell(column, expected, e)),
                _ => Err(TableError::UnknownColumn(column.to_string())),
            }
        }

        fn describe(&self) -> String {
            format!("{}={}", self.key, self.value)
        }
    }

    fn table(rows: &[&[&str]]) -> DataTable {
        DataTable::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|c| (*c).to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_from_rows() {
        let t = table(&[&["Key", "Value"], &["a", "1"]]);
        assert_eq!(t.header(), ["Key".to_string(), "Value".to_string()]);
        assert_eq!(t.rows().next().unwrap(), vec![("Key", "a"), ("Value", "1")]);
    }

    #[test]
    fn test_from_rows_rejects_ragged_row() {
        let result = DataTable::from_rows(vec![
            vec!["Key".to_string(), "Value".to_string()],
            vec!["a".to_string()],
        ]);
        assert!(matches!(result, Err(DomainError::InvalidTable(_))));
    }

    #[test]
    fn test_compare_rows_ignores_order() {
        let t = table(&[&["Key", "Value"], &["b", "2"], &["a", "1"]]);
        let actual = [Pair { key: "a", value: 1 }, Pair { key: "b", value: 2 }];
        assert_eq!(compare_rows(&t, &actual).unwrap(), Ok(()));
    }

    #[test]
    fn test_compare_rows_reports_missing_and_unexpected() {
        let t = table(&[&["Key", "Value"], &["a", "1"]]);
        let actual = [Pair { key: "a", value: 2 }];
        let report = compare_rows(&t, &actual).unwrap().unwrap_err();
        assert!(report.contains("missing: {Key=a, Value=1}"));
        assert!(report.contains("unexpected: a=2"));
    }

    #[test]
    fn test_compare_rows_counts_duplicates() {
        let t = table(&[&["Key"], &["a"], &["a"]]);
        let actual = [Pair { key: "a", value: 1 }];
        assert!(compare_rows(&t, &actual).unwrap().is_err());
    }

    #[test]
    fn test_compare_rows_propagates_cell_errors() {
        let t = table(&[&["Other"], &["x"]]);
        let actual = [Pair { key: "a", value: 1 }];
        assert_eq!(
            compare_rows(&t, &actual),
            Err(TableError::UnknownColumn("Other".to_string()))
        );
    }

    #[test]
    fn test_empty_table_matches_empty_rows() {
        let t = table(&[&["Key"]]);
        let actual: [Pair; 0] = [];
        assert_eq!(compare_rows(&t, &actual).unwrap(), Ok(()));
    }
}
