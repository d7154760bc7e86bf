use anyhow::Result;

use crate::models::{NoteRow, UserRow};

/// Persistence seam used by the HTTP layer. Each call is atomic on its own
/// row; callers get no cross-call transaction.
pub trait Store: Send + Sync {
    /// Insert a user and return its id, or `None` if the username is taken.
    fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<i64>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>>;

    fn insert_note(&self, owner_id: i64, title: &str, content: &str) -> Result<NoteRow>;
    /// All notes owned by `owner_id`, oldest first.
    fn list_notes(&self, owner_id: i64) -> Result<Vec<NoteRow>>;
    fn get_note(&self, id: i64) -> Result<Option<NoteRow>>;
    /// Owner of note `id`, or `None` if there is no such note.
    fn note_owner(&self, id: i64) -> Result<Option<i64>>;
    /// Replace title and content and refresh `updated_at`.
    fn update_note(&self, id: i64, title: &str, content: &str) -> Result<Option<NoteRow>>;
    /// Delete and return the removed row.
    fn delete_note(&self, id: i64) -> Result<Option<NoteRow>>;
}
