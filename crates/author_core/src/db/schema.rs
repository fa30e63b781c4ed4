//! Fixed `author` table definition and readiness checks.

use super::{DbError, DbResult};
use rusqlite::Connection;

/// Table holding author rows.
pub const AUTHOR_TABLE: &str = "author";

/// Columns every author store relies on.
pub const AUTHOR_COLUMNS: &[&str] = &[
    "authorId",
    "authorActivationToken",
    "authorEmail",
    "authorHash",
    "authorUsername",
    "authorAvatarUrl",
];

// Text bounds count UTF-8 bytes, the same unit the field validators use.
const AUTHOR_SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS author (
    authorId BLOB PRIMARY KEY NOT NULL CHECK (length(authorId) = 16),
    authorActivationToken TEXT NULL CHECK (authorActivationToken IS NULL OR length(authorActivationToken) = 32),
    authorEmail TEXT NOT NULL COLLATE NOCASE UNIQUE CHECK (length(CAST(authorEmail AS BLOB)) <= 128),
    authorHash TEXT NOT NULL,
    authorUsername TEXT NOT NULL COLLATE NOCASE UNIQUE CHECK (length(CAST(authorUsername AS BLOB)) <= 32),
    authorAvatarUrl TEXT NOT NULL CHECK (length(CAST(authorAvatarUrl AS BLOB)) <= 255)
);";

/// Creates the `author` table if it does not exist yet.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(AUTHOR_SCHEMA_SQL)?;
    Ok(())
}

/// Verifies that the connection exposes the `author` table with all columns.
pub fn ensure_author_table_ready(conn: &Connection) -> DbResult<()> {
    if !table_exists(conn, AUTHOR_TABLE)? {
        return Err(DbError::MissingRequiredTable(AUTHOR_TABLE));
    }

    let existing = table_columns(conn, AUTHOR_TABLE)?;
    for &column in AUTHOR_COLUMNS {
        if !existing.iter().any(|name| name == column) {
            return Err(DbError::MissingRequiredColumn {
                table: AUTHOR_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::{ensure_author_table_ready, ensure_schema};
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        ensure_author_table_ready(&conn).unwrap();
    }

    #[test]
    fn missing_column_is_reported() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE author (authorId BLOB PRIMARY KEY NOT NULL);")
            .unwrap();

        let err = ensure_author_table_ready(&conn).unwrap_err();
        assert!(matches!(
            err,
            DbError::MissingRequiredColumn {
                table: "author",
                column: "authorActivationToken"
            }
        ));
    }
}
