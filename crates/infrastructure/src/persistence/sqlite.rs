//! SQLite member store.
//!
//! Each session owns its own connection. Timestamps are stored as RFC 3339
//! text so their offsets survive a round trip.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use memberdesk_application::ports::{MemberSession, SessionFactory};
use memberdesk_application::{ApplicationError, ApplicationResult};
use memberdesk_domain::Member;
use parking_lot::Mutex;
use rusqlite::{Connection, ErrorCode, OpenFlags, OptionalExtension, Row, params};
use tracing::debug;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS members (
    sequence_id INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    name TEXT,
    age INTEGER,
    email TEXT,
    created_at TEXT NOT NULL,
    created_by TEXT,
    changed_at TEXT,
    changed_by TEXT
);
";

const COLUMNS: &str =
    "sequence_id, id, name, age, email, created_at, created_by, changed_at, changed_by";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Strips an optional `sqlite://` or `sqlite:` scheme from a database URL.
#[must_use]
pub fn database_path(url: &str) -> PathBuf {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    PathBuf::from(path)
}

/// Opens sessions against a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteSessionFactory {
    path: PathBuf,
}

impl SqliteSessionFactory {
    /// Creates a factory for the database at `database_url`.
    #[must_use]
    pub fn new(database_url: &str) -> Self {
        Self {
            path: database_path(database_url),
        }
    }

    fn open(&self, read_only: bool) -> ApplicationResult<SqliteSession> {
        let conn = if read_only {
            Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        } else {
            Connection::open(&self.path)
        }
        .map_err(storage)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(storage)?;

        debug!(path = %self.path.display(), read_only, "opened SQLite session");
        Ok(SqliteSession {
            conn: Mutex::new(conn),
        })
    }
}

impl SessionFactory for SqliteSessionFactory {
    fn create_session(&self) -> ApplicationResult<Box<dyn MemberSession>> {
        Ok(Box::new(self.open(false)?))
    }

    fn create_read_only_session(&self) -> ApplicationResult<Box<dyn MemberSession>> {
        Ok(Box::new(self.open(true)?))
    }
}

/// A session over one SQLite connection.
pub struct SqliteSession {
    conn: Mutex<Connection>,
}

impl SqliteSession {
    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> ApplicationResult<T> {
        let conn = self.conn.lock();
        f(&conn).map_err(storage)
    }

    fn fetch(&self, id: &str) -> ApplicationResult<Option<Member>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM members WHERE id = ?1"),
                params![id],
                member_from_row,
            )
            .optional()
        })
    }
}

fn storage(error: rusqlite::Error) -> ApplicationError {
    match &error {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            ApplicationError::Conflict(error.to_string())
        }
        _ => ApplicationError::Storage(error.to_string()),
    }
}

fn parse_column(index: usize, text: &str) -> rusqlite::Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn member_from_row(row: &Row<'_>) -> rusqlite::Result<Member> {
    let created_at: String = row.get(5)?;
    let changed_at: Option<String> = row.get(7)?;
    Ok(Member {
        sequence_id: row.get(0)?,
        id: row.get(1)?,
        name: row.get(2)?,
        age: row.get(3)?,
        email: row.get(4)?,
        created_at: parse_column(5, &created_at)?,
        created_by: row.get(6)?,
        changed_at: changed_at.map(|text| parse_column(7, &text)).transpose()?,
        changed_by: row.get(8)?,
    })
}

#[async_trait]
impl MemberSession for SqliteSession {
    async fn initialize(&self) -> ApplicationResult<()> {
        self.with_conn(|conn| conn.execute_batch(SCHEMA))?;
        debug!("member schema initialized");
        Ok(())
    }

    async fn list_all(&self) -> ApplicationResult<Vec<Member>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM members ORDER BY sequence_id"))?;
            let rows = stmt.query_map([], member_from_row)?;
            rows.collect()
        })
    }

    async fn get(&self, id: &str) -> ApplicationResult<Option<Member>> {
        self.fetch(id)
    }

    async fn insert(&self, member: &Member) -> ApplicationResult<Member> {
        let sequence_id = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO members (id, name, age, email, created_at, created_by, changed_at, changed_by)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    member.id,
                    member.name,
                    member.age,
                    member.email,
                    member.created_at.to_rfc3339(),
                    member.created_by,
                    member.changed_at.map(|t| t.to_rfc3339()),
                    member.changed_by,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        Ok(Member {
            sequence_id,
            ..member.clone()
        })
    }

    async fn update(&self, member: &Member) -> ApplicationResult<Member> {
        let changed = self.with_conn(|conn| {
            conn.execute(
                "UPDATE members SET name = ?2, age = ?3, email = ?4, created_at = ?5,
                 created_by = ?6, changed_at = ?7, changed_by = ?8 WHERE id = ?1",
                params![
                    member.id,
                    member.name,
                    member.age,
                    member.email,
                    member.created_at.to_rfc3339(),
                    member.created_by,
                    member.changed_at.map(|t| t.to_rfc3339()),
                    member.changed_by,
                ],
            )
        })?;

        if changed == 0 {
            return Err(ApplicationError::NotFound(format!("member '{}'", member.id)));
        }
        self.fetch(&member.id)?
            .ok_or_else(|| ApplicationError::NotFound(format!("member '{}'", member.id)))
    }

    async fn delete(&self, id: &str) -> ApplicationResult<bool> {
        let removed =
            self.with_conn(|conn| conn.execute("DELETE FROM members WHERE id = ?1", params![id]))?;
        Ok(removed > 0)
    }

    async fn clear(&self) -> ApplicationResult<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "DELETE FROM members;
                 DELETE FROM sqlite_sequence WHERE name = 'members';",
            )
        })
    }
}
