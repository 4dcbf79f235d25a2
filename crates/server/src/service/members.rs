use anyhow::anyhow;
use noteforge_common::types::{WorkspaceMember, WorkspaceRole};
use uuid::Uuid;

use crate::{
    authz::{
        self,
        guard::{self, Decision},
        resolver, Authorized, RoleSet,
    },
    error::AppError,
    store::Store,
};

#[derive(Clone)]
pub struct MemberService {
    store: Store,
}

impl MemberService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        workspace_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Vec<WorkspaceMember>, AppError> {
        let authorized =
            authz::authorize(&self.store, RoleSet::VIEWER_OR_ABOVE, workspace_id, requester_id)
                .await?;
        self.list_authorized(&authorized).await
    }

    /// The owner comes first with role OWNER and no join time, followed by
    /// membership rows in join order. A membership row held by the owner is
    /// not listed separately.
    pub async fn list_authorized(
        &self,
        authorized: &Authorized,
    ) -> Result<Vec<WorkspaceMember>, AppError> {
        let workspace_id = authorized.workspace.id;
        let owner_id = authorized.workspace.owner_id;
        let owner = self.store.user_by_id(owner_id).await?.ok_or_else(|| {
            AppError::Internal(anyhow!("owner {owner_id} of workspace {workspace_id} is missing"))
        })?;

        let mut members = vec![WorkspaceMember {
            user_id: owner.id,
            email: owner.email,
            username: owner.username,
            role: WorkspaceRole::Owner,
            joined_at: None,
        }];
        members.extend(
            self.store
                .list_memberships(workspace_id)
                .await?
                .into_iter()
                .filter(|member| member.user_id != owner_id),
        );
        Ok(members)
    }

    pub async fn add(
        &self,
        workspace_id: Uuid,
        target_id: Uuid,
        role: WorkspaceRole,
        requester_id: Uuid,
    ) -> Result<WorkspaceMember, AppError> {
        self.authorize_change(workspace_id, target_id, requester_id, "cannot change owner role")
            .await?;
        let target = self
            .store
            .user_by_id(target_id)
            .await?
            .ok_or(AppError::NotFound("user not found"))?;

        let joined_at = self.store.insert_membership(workspace_id, target_id, role).await?;
        tracing::info!(%workspace_id, user_id = %target_id, %role, "member added");

        Ok(WorkspaceMember {
            user_id: target.id,
            email: target.email,
            username: target.username,
            role,
            joined_at: Some(joined_at),
        })
    }

    pub async fn update_role(
        &self,
        workspace_id: Uuid,
        target_id: Uuid,
        role: WorkspaceRole,
        requester_id: Uuid,
    ) -> Result<(), AppError> {
        self.authorize_change(workspace_id, target_id, requester_id, "cannot change owner role")
            .await?;

        if !self.store.update_membership_role(workspace_id, target_id, role).await? {
            return Err(AppError::NotFound("member not found"));
        }
        tracing::info!(%workspace_id, user_id = %target_id, %role, "member role changed");
        Ok(())
    }

    pub async fn remove(
        &self,
        workspace_id: Uuid,
        target_id: Uuid,
        requester_id: Uuid,
    ) -> Result<(), AppError> {
        self.authorize_change(workspace_id, target_id, requester_id, "cannot remove workspace owner")
            .await?;

        if !self.store.delete_membership(workspace_id, target_id).await? {
            return Err(AppError::NotFound("member not found"));
        }
        tracing::info!(%workspace_id, user_id = %target_id, "member removed");
        Ok(())
    }

    /// Owner immunity is checked before the requester's role, so changes
    /// aimed at the owner fail the same way for every requester.
    async fn authorize_change(
        &self,
        workspace_id: Uuid,
        target_id: Uuid,
        requester_id: Uuid,
        immunity_reason: &'static str,
    ) -> Result<Authorized, AppError> {
        let resolution = resolver::resolve(&self.store, workspace_id, requester_id).await?;
        if resolution.workspace.owner_id == target_id {
            return Err(AppError::Forbidden(immunity_reason));
        }

        match guard::decide(RoleSet::OWNER_ONLY, resolution, requester_id) {
            Decision::Allow(authorized) => Ok(authorized),
            Decision::Deny(denial) => Err(denial.into()),
        }
    }
}
