use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use noteforge_common::types::{Note, NoteType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiState;
use crate::{
    auth::middleware::AuthenticatedUser, authz::Authorized, error::AppError,
    service::notes::{NoteDraft, NotePage, NoteQuery},
    store::NoteChanges,
    validation::{ValidatedJson, ValidatedQuery},
};

#[derive(Debug, Deserialize)]
pub(super) struct CreateNoteRequest {
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default, rename = "type")]
    note_type: NoteType,
    audio_file_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ListNotesQuery {
    search: Option<String>,
    #[serde(rename = "type")]
    note_type: Option<NoteType>,
    author_id: Option<Uuid>,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateNoteRequest {
    title: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SetSummaryRequest {
    summary: String,
}

#[derive(Debug, Serialize)]
pub(super) struct NoteEnvelope {
    note: Note,
}

pub(super) async fn list_notes(
    State(state): State<ApiState>,
    Extension(authorized): Extension<Authorized>,
    ValidatedQuery(query): ValidatedQuery<ListNotesQuery>,
) -> Result<Json<NotePage>, AppError> {
    let query = NoteQuery {
        search: query.search,
        note_type: query.note_type,
        author_id: query.author_id,
        page: query.page,
        limit: query.limit,
    };
    let page = state.services.notes.list_authorized(&authorized, query).await?;
    Ok(Json(page))
}

pub(super) async fn create_note(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(workspace_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteEnvelope>), AppError> {
    let draft = NoteDraft {
        title: payload.title,
        content: payload.content,
        note_type: payload.note_type,
        audio_file_id: payload.audio_file_id,
    };
    let note = state.services.notes.create(workspace_id, user.user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(NoteEnvelope { note })))
}

pub(super) async fn get_note(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(note_id): Path<Uuid>,
) -> Result<Json<NoteEnvelope>, AppError> {
    let note = state.services.notes.get(note_id, user.user_id).await?;
    Ok(Json(NoteEnvelope { note }))
}

pub(super) async fn update_note(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(note_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateNoteRequest>,
) -> Result<Json<NoteEnvelope>, AppError> {
    let changes = NoteChanges { title: payload.title, content: payload.content };
    let note = state.services.notes.update(note_id, user.user_id, changes).await?;
    Ok(Json(NoteEnvelope { note }))
}

pub(super) async fn set_note_summary(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(note_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SetSummaryRequest>,
) -> Result<Json<NoteEnvelope>, AppError> {
    let note = state.services.notes.set_summary(note_id, user.user_id, payload.summary).await?;
    Ok(Json(NoteEnvelope { note }))
}

pub(super) async fn delete_note(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(note_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.services.notes.delete(note_id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
