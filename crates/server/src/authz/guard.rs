use noteforge_common::types::{Note, WorkspaceRole};
use uuid::Uuid;

use super::resolver::{self, Resolution};
use crate::{
    error::AppError,
    store::{Store, WorkspaceRecord},
};

/// Set of roles an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(&'static [WorkspaceRole]);

impl RoleSet {
    pub const OWNER_ONLY: Self = Self(&[WorkspaceRole::Owner]);
    pub const EDITOR_OR_ABOVE: Self = Self(&[WorkspaceRole::Owner, WorkspaceRole::Editor]);
    pub const VIEWER_OR_ABOVE: Self =
        Self(&[WorkspaceRole::Owner, WorkspaceRole::Editor, WorkspaceRole::Viewer]);

    pub fn contains(self, role: WorkspaceRole) -> bool {
        self.0.contains(&role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NotAMember,
    InsufficientRole,
}

impl Denial {
    pub const fn reason(self) -> &'static str {
        match self {
            Self::NotAMember => "caller is not a member of this workspace",
            Self::InsufficientRole => "caller lacks required role",
        }
    }
}

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        AppError::Forbidden(denial.reason())
    }
}

/// Proof that `user_id` passed the guard for `workspace`. Carries the
/// resolved role so the gated operation does not resolve it again.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub workspace: WorkspaceRecord,
    pub user_id: Uuid,
    pub role: WorkspaceRole,
}

#[derive(Debug, Clone)]
pub enum Decision {
    Allow(Authorized),
    Deny(Denial),
}

pub fn decide(required: RoleSet, resolution: Resolution, user_id: Uuid) -> Decision {
    match resolution.role {
        None => Decision::Deny(Denial::NotAMember),
        Some(role) if !required.contains(role) => Decision::Deny(Denial::InsufficientRole),
        Some(role) => Decision::Allow(Authorized { workspace: resolution.workspace, user_id, role }),
    }
}

/// Resolves the caller's role on every call; nothing is cached.
pub async fn authorize(
    store: &Store,
    required: RoleSet,
    workspace_id: Uuid,
    user_id: Uuid,
) -> Result<Authorized, AppError> {
    let resolution = resolver::resolve(store, workspace_id, user_id).await?;
    match decide(required, resolution, user_id) {
        Decision::Allow(authorized) => Ok(authorized),
        Decision::Deny(denial) => {
            tracing::debug!(%workspace_id, %user_id, ?denial, "workspace access denied");
            Err(denial.into())
        }
    }
}

/// Note gate: a note has no access list of its own, so the caller is
/// authorized against the note's workspace.
pub async fn authorize_note(
    store: &Store,
    required: RoleSet,
    note_id: Uuid,
    user_id: Uuid,
) -> Result<(Note, Authorized), AppError> {
    let note = store.note_by_id(note_id).await?.ok_or(AppError::NotFound("note not found"))?;
    let authorized = authorize(store, required, note.workspace_id, user_id).await?;
    Ok((note, authorized))
}
