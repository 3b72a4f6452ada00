//! CNIS Store — SQLite persistence of client employment histories.

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteProfileStore;
