use noteforge_common::types::{Note, NoteType, WorkspaceRole};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    authz::{self, Authorized, RoleSet},
    error::AppError,
    store::{NewNote, NoteChanges, NoteFilter, Store},
    validation,
};

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

fn normalize_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) => DEFAULT_PAGE_SIZE,
        Some(value) => value.min(MAX_PAGE_SIZE),
        None => DEFAULT_PAGE_SIZE,
    }
}

/// Listing parameters. Pages are 1-based; a missing or zero page is the first.
#[derive(Debug, Clone, Default)]
pub struct NoteQuery {
    pub search: Option<String>,
    pub note_type: Option<NoteType>,
    pub author_id: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotePage {
    pub items: Vec<Note>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub note_type: NoteType,
    pub audio_file_id: Option<Uuid>,
}

/// Every note operation is authorized against the note's workspace.
#[derive(Clone)]
pub struct NoteService {
    store: Store,
}

impl NoteService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        workspace_id: Uuid,
        author_id: Uuid,
        draft: NoteDraft,
    ) -> Result<Note, AppError> {
        let title = validation::note_title(&draft.title)?;
        validation::note_content(&draft.content)?;
        authz::authorize(&self.store, RoleSet::EDITOR_OR_ABOVE, workspace_id, author_id).await?;

        let note = self
            .store
            .insert_note(NewNote {
                workspace_id,
                author_id,
                title,
                content: draft.content,
                note_type: draft.note_type,
                audio_file_id: draft.audio_file_id,
            })
            .await?;
        tracing::debug!(%workspace_id, note_id = %note.id, "note created");
        Ok(note)
    }

    pub async fn get(&self, note_id: Uuid, user_id: Uuid) -> Result<Note, AppError> {
        let (note, _) =
            authz::authorize_note(&self.store, RoleSet::VIEWER_OR_ABOVE, note_id, user_id).await?;
        Ok(note)
    }

    pub async fn list(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        query: NoteQuery,
    ) -> Result<NotePage, AppError> {
        let authorized =
            authz::authorize(&self.store, RoleSet::VIEWER_OR_ABOVE, workspace_id, user_id).await?;
        self.list_authorized(&authorized, query).await
    }

    /// Filtered page of the workspace's notes, most recently updated first,
    /// with the total across all pages.
    pub async fn list_authorized(
        &self,
        authorized: &Authorized,
        query: NoteQuery,
    ) -> Result<NotePage, AppError> {
        let filter = NoteFilter {
            author_id: query.author_id,
            note_type: query.note_type,
            search: validation::note_search(query.search.as_deref())?,
        };
        let page = query.page.filter(|page| *page > 0).unwrap_or(1);
        let limit = normalize_limit(query.limit);
        let offset = u64::from(page - 1) * u64::from(limit);

        let workspace_id = authorized.workspace.id;
        let total = self.store.count_notes(workspace_id, &filter).await?;
        let items = self.store.list_notes(workspace_id, &filter, offset, u64::from(limit)).await?;

        Ok(NotePage {
            items,
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages: total.div_ceil(u64::from(limit)),
            },
        })
    }

    pub async fn update(
        &self,
        note_id: Uuid,
        user_id: Uuid,
        changes: NoteChanges,
    ) -> Result<Note, AppError> {
        if changes.title.is_none() && changes.content.is_none() {
            return Err(AppError::validation("no note fields to update"));
        }
        let changes = NoteChanges {
            title: changes.title.as_deref().map(validation::note_title).transpose()?,
            content: changes.content,
        };
        if let Some(content) = changes.content.as_deref() {
            validation::note_content(content)?;
        }
        authz::authorize_note(&self.store, RoleSet::EDITOR_OR_ABOVE, note_id, user_id).await?;

        self.store.update_note(note_id, changes).await?.ok_or(AppError::NotFound("note not found"))
    }

    pub async fn set_summary(
        &self,
        note_id: Uuid,
        user_id: Uuid,
        summary: String,
    ) -> Result<Note, AppError> {
        validation::note_summary(&summary)?;
        authz::authorize_note(&self.store, RoleSet::EDITOR_OR_ABOVE, note_id, user_id).await?;

        self.store
            .set_note_summary(note_id, summary)
            .await?
            .ok_or(AppError::NotFound("note not found"))
    }

    /// Editors may only delete their own notes; owners may delete any.
    pub async fn delete(&self, note_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let (note, authorized) =
            authz::authorize_note(&self.store, RoleSet::EDITOR_OR_ABOVE, note_id, user_id).await?;
        if authorized.role != WorkspaceRole::Owner && note.author_id != user_id {
            return Err(AppError::Forbidden("only the author or a workspace owner can delete a note"));
        }

        if !self.store.delete_note(note_id).await? {
            return Err(AppError::NotFound("note not found"));
        }
        tracing::debug!(workspace_id = %note.workspace_id, %note_id, "note deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

    #[test]
    fn page_size_defaults_and_caps() {
        assert_eq!(normalize_limit(None), DEFAULT_PAGE_SIZE);
        assert_eq!(normalize_limit(Some(0)), DEFAULT_PAGE_SIZE);
        assert_eq!(normalize_limit(Some(25)), 25);
        assert_eq!(normalize_limit(Some(MAX_PAGE_SIZE + 1)), MAX_PAGE_SIZE);
    }
}
