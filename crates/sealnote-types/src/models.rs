use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note as handlers return it. `owner_id` is the id of the user whose
/// session created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
