//! Persistence adapters.

mod sqlite;

pub use sqlite::{SqliteSession, SqliteSessionFactory, database_path};
