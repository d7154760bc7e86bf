use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{info, warn};

use sealnote_db::NoteRow;
use sealnote_types::api::{NoteMutationResponse, NoteRequest};
use sealnote_types::models::Note;

use crate::error::ApiError;
use crate::guard::{self, Action};
use crate::state::{AppState, with_store};
use crate::token::Caller;

const TITLE_MAX: usize = 255;

type NoteId = WithRejection<Path<i64>, ApiError>;
type NoteBody = WithRejection<Json<NoteRequest>, ApiError>;

/// POST /notes. The caller becomes the owner.
pub async fn create_note(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    WithRejection(Json(req), _): NoteBody,
) -> Result<impl IntoResponse, ApiError> {
    let (title, content) = validate_note(req)?;

    let row = with_store(&state, move |store| {
        store.insert_note(caller.user_id, &title, &content)
    })
    .await?;

    info!("User {} created note {}", caller.user_id, row.id);
    Ok((StatusCode::CREATED, Json(to_note(row))))
}

/// GET /notes: only the caller's own notes; no guard needed.
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let rows = with_store(&state, move |store| store.list_notes(caller.user_id)).await?;
    Ok(Json(rows.into_iter().map(to_note).collect()))
}

pub async fn get_note(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    WithRejection(Path(id), _): NoteId,
) -> Result<Json<Note>, ApiError> {
    authorize(&state, caller, id, Action::Read).await?;

    let row = with_store(&state, move |store| store.get_note(id))
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(to_note(row)))
}

pub async fn update_note(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    WithRejection(Path(id), _): NoteId,
    WithRejection(Json(req), _): NoteBody,
) -> Result<Json<NoteMutationResponse>, ApiError> {
    let (title, content) = validate_note(req)?;
    authorize(&state, caller, id, Action::Update).await?;

    let row = with_store(&state, move |store| store.update_note(id, &title, &content))
        .await?
        .ok_or(ApiError::NotFound)?;

    info!("User {} updated note {}", caller.user_id, id);
    Ok(Json(NoteMutationResponse {
        message: "Note updated successfully".into(),
        note: to_note(row),
    }))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    WithRejection(Path(id), _): NoteId,
) -> Result<Json<NoteMutationResponse>, ApiError> {
    authorize(&state, caller, id, Action::Delete).await?;

    let row = with_store(&state, move |store| store.delete_note(id))
        .await?
        .ok_or(ApiError::NotFound)?;

    info!("User {} deleted note {}", caller.user_id, id);
    Ok(Json(NoteMutationResponse {
        message: "Note deleted successfully".into(),
        note: to_note(row),
    }))
}

/// 404 if the note does not exist, otherwise the ownership guard decides.
async fn authorize(state: &AppState, caller: Caller, id: i64, action: Action) -> Result<(), ApiError> {
    let owner_id = with_store(state, move |store| store.note_owner(id))
        .await?
        .ok_or(ApiError::NotFound)?;

    guard::enforce(action, id, owner_id, caller, state.allow_idor)
}

fn validate_note(req: NoteRequest) -> Result<(String, String), ApiError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }
    if title.chars().count() > TITLE_MAX {
        return Err(ApiError::Validation(format!(
            "Title must be at most {} characters",
            TITLE_MAX
        )));
    }
    Ok((title.to_string(), req.content))
}

fn to_note(row: NoteRow) -> Note {
    Note {
        id: row.id,
        owner_id: row.user_id,
        created_at: parse_timestamp(&row.created_at, row.id),
        updated_at: parse_timestamp(&row.updated_at, row.id),
        title: row.title,
        content: row.content,
    }
}

fn parse_timestamp(raw: &str, note_id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on note {}: {}", raw, note_id, e);
            DateTime::default()
        })
}
