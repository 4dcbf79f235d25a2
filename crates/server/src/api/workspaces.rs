use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use noteforge_common::types::{Membership, Workspace};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiState;
use crate::{
    auth::middleware::AuthenticatedUser, authz::Authorized, error::AppError,
    service::workspaces::workspace_view, validation::ValidatedJson,
};

#[derive(Debug, Deserialize)]
pub(super) struct CreateWorkspaceRequest {
    name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateWorkspaceRequest {
    name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct WorkspaceEnvelope {
    workspace: Workspace,
}

#[derive(Debug, Serialize)]
pub(super) struct WorkspacesEnvelope {
    items: Vec<Workspace>,
}

#[derive(Debug, Serialize)]
pub(super) struct MembershipEnvelope {
    membership: Membership,
}

#[derive(Debug, Serialize)]
pub(super) struct InviteLinkEnvelope {
    invite_secret: String,
}

pub(super) async fn create_workspace(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(payload): ValidatedJson<CreateWorkspaceRequest>,
) -> Result<(StatusCode, Json<WorkspaceEnvelope>), AppError> {
    let workspace = state.services.workspaces.create(user.user_id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(WorkspaceEnvelope { workspace })))
}

pub(super) async fn list_workspaces(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<WorkspacesEnvelope>, AppError> {
    let items = state.services.workspaces.list(user.user_id).await?;
    Ok(Json(WorkspacesEnvelope { items }))
}

pub(super) async fn get_workspace(
    Extension(authorized): Extension<Authorized>,
) -> Json<WorkspaceEnvelope> {
    Json(WorkspaceEnvelope { workspace: workspace_view(authorized.workspace, authorized.role) })
}

pub(super) async fn update_workspace(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(workspace_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateWorkspaceRequest>,
) -> Result<Json<WorkspaceEnvelope>, AppError> {
    let workspace =
        state.services.workspaces.rename(workspace_id, user.user_id, &payload.name).await?;
    Ok(Json(WorkspaceEnvelope { workspace }))
}

pub(super) async fn delete_workspace(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(workspace_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.services.workspaces.delete(workspace_id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn regenerate_invite_link(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<InviteLinkEnvelope>, AppError> {
    let invite_secret =
        state.services.workspaces.regenerate_invite_link(workspace_id, user.user_id).await?;
    Ok(Json(InviteLinkEnvelope { invite_secret }))
}

pub(super) async fn join_workspace(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(secret): Path<String>,
) -> Result<(StatusCode, Json<MembershipEnvelope>), AppError> {
    let membership = state.services.workspaces.join_by_invite_link(&secret, user.user_id).await?;
    Ok((StatusCode::CREATED, Json(MembershipEnvelope { membership })))
}
