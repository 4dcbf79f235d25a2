use std::sync::Arc;

use noteforge_common::types::{Membership, Workspace, WorkspaceRole};
use uuid::Uuid;

use crate::{
    authz::{self, resolver, Authorized, RoleSet},
    error::AppError,
    secrets::SecretGenerator,
    store::{Store, WorkspaceRecord},
    validation,
};

/// Shapes a workspace row for a caller holding `role`. Only owners see the
/// invite secret.
pub fn workspace_view(record: WorkspaceRecord, role: WorkspaceRole) -> Workspace {
    let invite_secret = (role == WorkspaceRole::Owner).then_some(record.invite_secret);
    Workspace {
        id: record.id,
        name: record.name,
        owner_id: record.owner_id,
        invite_secret,
        role,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

#[derive(Clone)]
pub struct WorkspaceService {
    store: Store,
    secrets: Arc<dyn SecretGenerator>,
}

impl WorkspaceService {
    pub fn new(store: Store, secrets: Arc<dyn SecretGenerator>) -> Self {
        Self { store, secrets }
    }

    /// Creates the workspace with `owner_id` as its structural owner. No
    /// membership row is written for the owner.
    pub async fn create(&self, owner_id: Uuid, name: &str) -> Result<Workspace, AppError> {
        let name = validation::workspace_name(name)?;
        if self.store.user_by_id(owner_id).await?.is_none() {
            return Err(AppError::NotFound("user not found"));
        }

        let record =
            self.store.insert_workspace(name, owner_id, self.secrets.invite_secret()).await?;
        tracing::info!(workspace_id = %record.id, %owner_id, "workspace created");

        Ok(workspace_view(record, WorkspaceRole::Owner))
    }

    pub async fn get(&self, workspace_id: Uuid, user_id: Uuid) -> Result<Workspace, AppError> {
        let authorized =
            authz::authorize(&self.store, RoleSet::VIEWER_OR_ABOVE, workspace_id, user_id).await?;
        Ok(view_of(authorized))
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Workspace>, AppError> {
        Ok(self
            .store
            .reachable_workspaces(user_id)
            .await?
            .into_iter()
            .filter_map(|reachable| {
                let role =
                    resolver::effective_role(&reachable.workspace, user_id, reachable.membership_role)?;
                Some(workspace_view(reachable.workspace, role))
            })
            .collect())
    }

    pub async fn rename(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        name: &str,
    ) -> Result<Workspace, AppError> {
        let name = validation::workspace_name(name)?;
        let authorized =
            authz::authorize(&self.store, RoleSet::OWNER_ONLY, workspace_id, user_id).await?;

        let record = self
            .store
            .rename_workspace(workspace_id, name)
            .await?
            .ok_or(AppError::NotFound("workspace not found"))?;
        Ok(workspace_view(record, authorized.role))
    }

    /// Only the structural owner may delete; an OWNER membership row is not
    /// enough.
    pub async fn delete(&self, workspace_id: Uuid, requester_id: Uuid) -> Result<(), AppError> {
        let workspace = self
            .store
            .workspace_by_id(workspace_id)
            .await?
            .ok_or(AppError::NotFound("workspace not found"))?;
        if workspace.owner_id != requester_id {
            return Err(AppError::Forbidden("only the workspace owner can delete it"));
        }

        if !self.store.delete_workspace_cascade(workspace_id).await? {
            return Err(AppError::NotFound("workspace not found"));
        }
        tracing::info!(%workspace_id, "workspace deleted");
        Ok(())
    }

    /// Joining always grants VIEWER, whatever role the user held before.
    pub async fn join_by_invite_link(
        &self,
        invite_secret: &str,
        user_id: Uuid,
    ) -> Result<Membership, AppError> {
        let invite_secret = invite_secret.trim();
        if invite_secret.is_empty() {
            return Err(AppError::NotFound("invite link is invalid"));
        }
        let workspace = self
            .store
            .workspace_by_invite_secret(invite_secret)
            .await?
            .ok_or(AppError::NotFound("invite link is invalid"))?;

        let already_member = workspace.owner_id == user_id
            || self.store.membership_role(workspace.id, user_id).await?.is_some();
        if already_member {
            return Err(AppError::Conflict("user is already a member of this workspace"));
        }

        let joined_at =
            self.store.insert_membership(workspace.id, user_id, WorkspaceRole::Viewer).await?;
        tracing::info!(workspace_id = %workspace.id, %user_id, "user joined via invite link");

        Ok(Membership { workspace_id: workspace.id, user_id, role: WorkspaceRole::Viewer, joined_at })
    }

    /// Swaps in a fresh secret. The previous one stops working immediately.
    pub async fn regenerate_invite_link(
        &self,
        workspace_id: Uuid,
        requester_id: Uuid,
    ) -> Result<String, AppError> {
        authz::authorize(&self.store, RoleSet::OWNER_ONLY, workspace_id, requester_id).await?;

        let record = self
            .store
            .replace_invite_secret(workspace_id, self.secrets.invite_secret())
            .await?
            .ok_or(AppError::NotFound("workspace not found"))?;
        tracing::info!(%workspace_id, "invite link regenerated");

        Ok(record.invite_secret)
    }
}

fn view_of(authorized: Authorized) -> Workspace {
    workspace_view(authorized.workspace, authorized.role)
}
