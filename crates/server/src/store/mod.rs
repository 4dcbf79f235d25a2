//! Persistence for users, workspaces, memberships, access requests and notes.
//!
//! [`Store`] dispatches to either PostgreSQL or an in-process map. Both
//! backends enforce the same uniqueness rules and report violations as
//! [`StoreError::Duplicate`]; nothing here upserts.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use noteforge_common::types::{
    AccessRequest, Note, NoteType, UserProfile, WorkspaceMember, WorkspaceRole,
};
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use self::memory::MemoryStore;

/// Uniqueness rule that a write would have violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    UserEmail,
    Username,
    Membership,
    InviteSecret,
    PendingAccessRequest,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for {0:?}")]
    Duplicate(UniqueKey),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        postgres::map_sqlx_error(error)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email,
            username: self.username,
            profile_picture: self.profile_picture,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub profile_picture: Option<String>,
}

/// A workspace row. `owner_id` never changes after insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRecord {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub invite_secret: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A workspace the user can reach, with their membership row's role if any.
#[derive(Debug, Clone)]
pub struct ReachableWorkspace {
    pub workspace: WorkspaceRecord,
    pub membership_role: Option<WorkspaceRole>,
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub workspace_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub note_type: NoteType,
    pub audio_file_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Narrows a note listing. Unset fields match every note.
#[derive(Debug, Clone, Default)]
pub struct NoteFilter {
    pub author_id: Option<Uuid>,
    pub note_type: Option<NoteType>,
    /// Case-insensitive substring of the title or the content.
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    Approved(AccessRequest),
    /// No PENDING request with that id exists in the workspace.
    NotPending,
    /// The requester no longer holds a membership row; nothing was changed.
    RequesterNotMember,
    /// The requester's role moved off VIEWER since the request was filed;
    /// nothing was changed.
    RequesterNotViewer(WorkspaceRole),
}

#[derive(Clone)]
pub enum Store {
    Postgres(PgPool),
    Memory(Arc<RwLock<MemoryStore>>),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(Arc::default())
    }

    pub async fn check_health(&self) -> StoreResult<()> {
        match self {
            Self::Postgres(pool) => postgres::check_health(pool).await,
            Self::Memory(_) => Ok(()),
        }
    }

    // Users

    pub async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        match self {
            Self::Postgres(pool) => postgres::insert_user(pool, user).await,
            Self::Memory(store) => store.write().await.insert_user(user),
        }
    }

    pub async fn user_by_id(&self, user_id: Uuid) -> StoreResult<Option<UserRecord>> {
        match self {
            Self::Postgres(pool) => postgres::user_by_id(pool, user_id).await,
            Self::Memory(store) => Ok(store.read().await.user_by_id(user_id)),
        }
    }

    pub async fn user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        match self {
            Self::Postgres(pool) => postgres::user_by_email(pool, email).await,
            Self::Memory(store) => Ok(store.read().await.user_by_email(email)),
        }
    }

    pub async fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        match self {
            Self::Postgres(pool) => postgres::list_users(pool).await,
            Self::Memory(store) => Ok(store.read().await.list_users()),
        }
    }

    pub async fn update_user_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> StoreResult<Option<UserRecord>> {
        match self {
            Self::Postgres(pool) => postgres::update_user_profile(pool, user_id, changes).await,
            Self::Memory(store) => store.write().await.update_user_profile(user_id, changes),
        }
    }

    /// Returns `false` when the user does not exist.
    pub async fn update_password_hash(
        &self,
        user_id: Uuid,
        password_hash: String,
    ) -> StoreResult<bool> {
        match self {
            Self::Postgres(pool) => postgres::update_password_hash(pool, user_id, &password_hash).await,
            Self::Memory(store) => {
                Ok(store.write().await.update_password_hash(user_id, password_hash))
            }
        }
    }

    // Workspaces

    pub async fn insert_workspace(
        &self,
        name: String,
        owner_id: Uuid,
        invite_secret: String,
    ) -> StoreResult<WorkspaceRecord> {
        match self {
            Self::Postgres(pool) => {
                postgres::insert_workspace(pool, &name, owner_id, &invite_secret).await
            }
            Self::Memory(store) => store.write().await.insert_workspace(name, owner_id, invite_secret),
        }
    }

    pub async fn workspace_by_id(&self, workspace_id: Uuid) -> StoreResult<Option<WorkspaceRecord>> {
        match self {
            Self::Postgres(pool) => postgres::workspace_by_id(pool, workspace_id).await,
            Self::Memory(store) => Ok(store.read().await.workspace_by_id(workspace_id)),
        }
    }

    pub async fn workspace_by_invite_secret(
        &self,
        invite_secret: &str,
    ) -> StoreResult<Option<WorkspaceRecord>> {
        match self {
            Self::Postgres(pool) => postgres::workspace_by_invite_secret(pool, invite_secret).await,
            Self::Memory(store) => Ok(store.read().await.workspace_by_invite_secret(invite_secret)),
        }
    }

    /// Workspaces the user owns or is a member of, newest first.
    pub async fn reachable_workspaces(&self, user_id: Uuid) -> StoreResult<Vec<ReachableWorkspace>> {
        match self {
            Self::Postgres(pool) => postgres::reachable_workspaces(pool, user_id).await,
            Self::Memory(store) => Ok(store.read().await.reachable_workspaces(user_id)),
        }
    }

    pub async fn rename_workspace(
        &self,
        workspace_id: Uuid,
        name: String,
    ) -> StoreResult<Option<WorkspaceRecord>> {
        match self {
            Self::Postgres(pool) => postgres::rename_workspace(pool, workspace_id, &name).await,
            Self::Memory(store) => Ok(store.write().await.rename_workspace(workspace_id, name)),
        }
    }

    /// Replaces the invite secret in a single write; the previous secret
    /// stops resolving as soon as this returns.
    pub async fn replace_invite_secret(
        &self,
        workspace_id: Uuid,
        invite_secret: String,
    ) -> StoreResult<Option<WorkspaceRecord>> {
        match self {
            Self::Postgres(pool) => {
                postgres::replace_invite_secret(pool, workspace_id, &invite_secret).await
            }
            Self::Memory(store) => {
                store.write().await.replace_invite_secret(workspace_id, invite_secret)
            }
        }
    }

    /// Deletes access requests, memberships and notes of the workspace, then
    /// the workspace itself, all or nothing. Returns `false` if it was absent.
    pub async fn delete_workspace_cascade(&self, workspace_id: Uuid) -> StoreResult<bool> {
        match self {
            Self::Postgres(pool) => postgres::delete_workspace_cascade(pool, workspace_id).await,
            Self::Memory(store) => Ok(store.write().await.delete_workspace_cascade(workspace_id)),
        }
    }

    // Memberships

    pub async fn membership_role(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<WorkspaceRole>> {
        match self {
            Self::Postgres(pool) => postgres::membership_role(pool, workspace_id, user_id).await,
            Self::Memory(store) => Ok(store.read().await.membership_role(workspace_id, user_id)),
        }
    }

    pub async fn insert_membership(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        role: WorkspaceRole,
    ) -> StoreResult<DateTime<Utc>> {
        match self {
            Self::Postgres(pool) => {
                postgres::insert_membership(pool, workspace_id, user_id, role).await
            }
            Self::Memory(store) => store.write().await.insert_membership(workspace_id, user_id, role),
        }
    }

    /// Returns `false` when no membership row exists.
    pub async fn update_membership_role(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        role: WorkspaceRole,
    ) -> StoreResult<bool> {
        match self {
            Self::Postgres(pool) => {
                postgres::update_membership_role(pool, workspace_id, user_id, role).await
            }
            Self::Memory(store) => {
                Ok(store.write().await.update_membership_role(workspace_id, user_id, role))
            }
        }
    }

    /// Removes the row and denies the member's PENDING access requests in the
    /// same write. Returns `false` when no membership row exists.
    pub async fn delete_membership(&self, workspace_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        match self {
            Self::Postgres(pool) => postgres::delete_membership(pool, workspace_id, user_id).await,
            Self::Memory(store) => Ok(store.write().await.delete_membership(workspace_id, user_id)),
        }
    }

    /// Membership rows joined with their users, oldest join first.
    pub async fn list_memberships(&self, workspace_id: Uuid) -> StoreResult<Vec<WorkspaceMember>> {
        match self {
            Self::Postgres(pool) => postgres::list_memberships(pool, workspace_id).await,
            Self::Memory(store) => Ok(store.read().await.list_memberships(workspace_id)),
        }
    }

    // Access requests

    pub async fn insert_access_request(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<AccessRequest> {
        match self {
            Self::Postgres(pool) => postgres::insert_access_request(pool, workspace_id, user_id).await,
            Self::Memory(store) => store.write().await.insert_access_request(workspace_id, user_id),
        }
    }

    pub async fn access_request_by_id(&self, request_id: Uuid) -> StoreResult<Option<AccessRequest>> {
        match self {
            Self::Postgres(pool) => postgres::access_request_by_id(pool, request_id).await,
            Self::Memory(store) => Ok(store.read().await.access_request_by_id(request_id)),
        }
    }

    pub async fn pending_access_requests(
        &self,
        workspace_id: Uuid,
    ) -> StoreResult<Vec<AccessRequest>> {
        match self {
            Self::Postgres(pool) => postgres::pending_access_requests(pool, workspace_id).await,
            Self::Memory(store) => Ok(store.read().await.pending_access_requests(workspace_id)),
        }
    }

    /// Marks the request APPROVED and upgrades the requester from VIEWER to
    /// EDITOR, or changes nothing.
    pub async fn approve_access_request(
        &self,
        workspace_id: Uuid,
        request_id: Uuid,
    ) -> StoreResult<ApprovalOutcome> {
        match self {
            Self::Postgres(pool) => {
                postgres::approve_access_request(pool, workspace_id, request_id).await
            }
            Self::Memory(store) => {
                Ok(store.write().await.approve_access_request(workspace_id, request_id))
            }
        }
    }

    /// Returns `None` when no PENDING request with that id exists in the workspace.
    pub async fn deny_access_request(
        &self,
        workspace_id: Uuid,
        request_id: Uuid,
    ) -> StoreResult<Option<AccessRequest>> {
        match self {
            Self::Postgres(pool) => postgres::deny_access_request(pool, workspace_id, request_id).await,
            Self::Memory(store) => {
                Ok(store.write().await.deny_access_request(workspace_id, request_id))
            }
        }
    }

    // Notes

    pub async fn insert_note(&self, note: NewNote) -> StoreResult<Note> {
        match self {
            Self::Postgres(pool) => postgres::insert_note(pool, note).await,
            Self::Memory(store) => Ok(store.write().await.insert_note(note)),
        }
    }

    pub async fn note_by_id(&self, note_id: Uuid) -> StoreResult<Option<Note>> {
        match self {
            Self::Postgres(pool) => postgres::note_by_id(pool, note_id).await,
            Self::Memory(store) => Ok(store.read().await.note_by_id(note_id)),
        }
    }

    /// One page of the workspace's notes matching `filter`, most recently
    /// updated first.
    pub async fn list_notes(
        &self,
        workspace_id: Uuid,
        filter: &NoteFilter,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Note>> {
        match self {
            Self::Postgres(pool) => {
                postgres::list_notes(pool, workspace_id, filter, offset, limit).await
            }
            Self::Memory(store) => {
                Ok(store.read().await.list_notes(workspace_id, filter, offset, limit))
            }
        }
    }

    pub async fn count_notes(&self, workspace_id: Uuid, filter: &NoteFilter) -> StoreResult<u64> {
        match self {
            Self::Postgres(pool) => postgres::count_notes(pool, workspace_id, filter).await,
            Self::Memory(store) => Ok(store.read().await.count_notes(workspace_id, filter)),
        }
    }

    pub async fn update_note(&self, note_id: Uuid, changes: NoteChanges) -> StoreResult<Option<Note>> {
        match self {
            Self::Postgres(pool) => postgres::update_note(pool, note_id, changes).await,
            Self::Memory(store) => Ok(store.write().await.update_note(note_id, changes)),
        }
    }

    pub async fn set_note_summary(&self, note_id: Uuid, summary: String) -> StoreResult<Option<Note>> {
        match self {
            Self::Postgres(pool) => postgres::set_note_summary(pool, note_id, &summary).await,
            Self::Memory(store) => Ok(store.write().await.set_note_summary(note_id, summary)),
        }
    }

    pub async fn delete_note(&self, note_id: Uuid) -> StoreResult<bool> {
        match self {
            Self::Postgres(pool) => postgres::delete_note(pool, note_id).await,
            Self::Memory(store) => Ok(store.write().await.delete_note(note_id)),
        }
    }
}
