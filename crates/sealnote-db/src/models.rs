/// Database row types. These map directly to SQLite rows.
/// Distinct from sealnote-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

/// Timestamps are SQLite `datetime('now')` text, `YYYY-MM-DD HH:MM:SS` in UTC.
#[derive(Debug, Clone)]
pub struct NoteRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}
