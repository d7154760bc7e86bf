use crate::Database;
use crate::models::{NoteRow, UserRow};
use crate::store::Store;
use anyhow::Result;
use rusqlite::{Connection, ErrorCode, Row};

const NOTE_COLUMNS: &str = "id, user_id, title, content, created_at, updated_at";

impl Store for Database {
    // -- Users --

    fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
                (username, password_hash),
            );
            match inserted {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                // username is the only unique column on users
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    // -- Notes --

    fn insert_note(&self, owner_id: i64, title: &str, content: &str) -> Result<NoteRow> {
        self.with_conn(|conn| {
            let sql = format!(
                "INSERT INTO notes (user_id, title, content) VALUES (?1, ?2, ?3) RETURNING {}",
                NOTE_COLUMNS
            );
            let row = conn.query_row(&sql, rusqlite::params![owner_id, title, content], note_from_row)?;
            Ok(row)
        })
    }

    fn list_notes(&self, owner_id: i64) -> Result<Vec<NoteRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM notes WHERE user_id = ?1 ORDER BY id",
                NOTE_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([owner_id], note_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn get_note(&self, id: i64) -> Result<Option<NoteRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS);
            conn.query_row(&sql, [id], note_from_row).optional()
        })
    }

    fn note_owner(&self, id: i64) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT user_id FROM notes WHERE id = ?1", [id], |row| row.get(0))
                .optional()
        })
    }

    fn update_note(&self, id: i64, title: &str, content: &str) -> Result<Option<NoteRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "UPDATE notes SET title = ?1, content = ?2, updated_at = datetime('now')
                 WHERE id = ?3 RETURNING {}",
                NOTE_COLUMNS
            );
            conn.query_row(&sql, rusqlite::params![title, content, id], note_from_row)
                .optional()
        })
    }

    fn delete_note(&self, id: i64) -> Result<Option<NoteRow>> {
        self.with_conn(|conn| {
            let sql = format!("DELETE FROM notes WHERE id = ?1 RETURNING {}", NOTE_COLUMNS);
            conn.query_row(&sql, [id], note_from_row).optional()
        })
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
    )?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<NoteRow> {
    Ok(NoteRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
