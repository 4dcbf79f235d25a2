use noteforge_common::types::{AccessRequest, WorkspaceRole};
use uuid::Uuid;

use crate::{
    authz::{self, guard::Denial, resolver, RoleSet},
    error::AppError,
    store::{ApprovalOutcome, Store},
};

/// Viewer-to-editor escalation requests.
#[derive(Clone)]
pub struct AccessRequestService {
    store: Store,
}

impl AccessRequestService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn request_edit_access(
        &self,
        workspace_id: Uuid,
        requester_id: Uuid,
    ) -> Result<AccessRequest, AppError> {
        match resolver::resolve_role(&self.store, workspace_id, requester_id).await? {
            None => return Err(Denial::NotAMember.into()),
            Some(WorkspaceRole::Owner | WorkspaceRole::Editor) => {
                return Err(AppError::Conflict("caller already has edit access"));
            }
            Some(WorkspaceRole::Viewer) => {}
        }

        let request = self.store.insert_access_request(workspace_id, requester_id).await?;
        tracing::info!(
            %workspace_id,
            user_id = %requester_id,
            request_id = %request.id,
            "edit access requested"
        );
        Ok(request)
    }

    pub async fn list_pending(
        &self,
        workspace_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Vec<AccessRequest>, AppError> {
        authz::authorize(&self.store, RoleSet::OWNER_ONLY, workspace_id, requester_id).await?;
        Ok(self.store.pending_access_requests(workspace_id).await?)
    }

    pub async fn approve(
        &self,
        workspace_id: Uuid,
        request_id: Uuid,
        requester_id: Uuid,
    ) -> Result<AccessRequest, AppError> {
        authz::authorize(&self.store, RoleSet::OWNER_ONLY, workspace_id, requester_id).await?;

        match self.store.approve_access_request(workspace_id, request_id).await? {
            ApprovalOutcome::Approved(request) => {
                tracing::info!(
                    %workspace_id,
                    %request_id,
                    user_id = %request.user_id,
                    "access request approved"
                );
                Ok(request)
            }
            ApprovalOutcome::NotPending => Err(self.not_pending(workspace_id, request_id).await),
            ApprovalOutcome::RequesterNotMember => {
                Err(AppError::Conflict("requester is no longer a member of this workspace"))
            }
            ApprovalOutcome::RequesterNotViewer(role) => {
                tracing::warn!(
                    %workspace_id,
                    %request_id,
                    current_role = role.as_str(),
                    "approval skipped; requester role changed since the request"
                );
                Err(AppError::Conflict("requester no longer holds the viewer role"))
            }
        }
    }

    pub async fn deny(
        &self,
        workspace_id: Uuid,
        request_id: Uuid,
        requester_id: Uuid,
    ) -> Result<AccessRequest, AppError> {
        authz::authorize(&self.store, RoleSet::OWNER_ONLY, workspace_id, requester_id).await?;

        match self.store.deny_access_request(workspace_id, request_id).await? {
            Some(request) => {
                tracing::info!(%workspace_id, %request_id, "access request denied");
                Ok(request)
            }
            None => Err(self.not_pending(workspace_id, request_id).await),
        }
    }

    async fn not_pending(&self, workspace_id: Uuid, request_id: Uuid) -> AppError {
        match self.store.access_request_by_id(request_id).await {
            Ok(Some(request)) if request.workspace_id == workspace_id => {
                AppError::Conflict("access request is already resolved")
            }
            Ok(_) => AppError::NotFound("access request not found"),
            Err(error) => error.into(),
        }
    }
}
