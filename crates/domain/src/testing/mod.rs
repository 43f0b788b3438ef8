//! Response and data assertions used by the acceptance harness.

mod assertion;
mod json_diff;
mod json_path;
mod operation;
mod table;

pub use assertion::{AssertionError, Mismatch, assert_body_equals, assert_path, assert_status};
pub use json_diff::{DiffEntry, DiffKind, JsonDiff};
pub use json_path::{JsonPath, JsonPathError};
pub use operation::{AssertionOperation, UnknownOperation};
pub use table::{DataTable, TableError, TableRow, compare_rows};
