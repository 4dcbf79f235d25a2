use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use noteforge_common::types::{AccessRequest, WorkspaceMember, WorkspaceRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiState;
use crate::{
    auth::middleware::AuthenticatedUser, authz::Authorized, error::AppError,
    validation::ValidatedJson,
};

#[derive(Debug, Deserialize)]
pub(super) struct AddMemberRequest {
    user_id: Uuid,
    role: WorkspaceRole,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateMemberRequest {
    role: WorkspaceRole,
}

#[derive(Debug, Serialize)]
pub(super) struct MemberEnvelope {
    member: WorkspaceMember,
}

#[derive(Debug, Serialize)]
pub(super) struct MembersEnvelope {
    items: Vec<WorkspaceMember>,
}

#[derive(Debug, Serialize)]
pub(super) struct AccessRequestEnvelope {
    access_request: AccessRequest,
}

#[derive(Debug, Serialize)]
pub(super) struct AccessRequestsEnvelope {
    items: Vec<AccessRequest>,
}

pub(super) async fn list_members(
    State(state): State<ApiState>,
    Extension(authorized): Extension<Authorized>,
) -> Result<Json<MembersEnvelope>, AppError> {
    let items = state.services.members.list_authorized(&authorized).await?;
    Ok(Json(MembersEnvelope { items }))
}

pub(super) async fn add_member(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(workspace_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberEnvelope>), AppError> {
    let member = state
        .services
        .members
        .add(workspace_id, payload.user_id, payload.role, user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(MemberEnvelope { member })))
}

pub(super) async fn update_member(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((workspace_id, target_user_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<UpdateMemberRequest>,
) -> Result<StatusCode, AppError> {
    state
        .services
        .members
        .update_role(workspace_id, target_user_id, payload.role, user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn remove_member(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((workspace_id, target_user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state.services.members.remove(workspace_id, target_user_id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn request_edit_access(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(workspace_id): Path<Uuid>,
) -> Result<(StatusCode, Json<AccessRequestEnvelope>), AppError> {
    let access_request =
        state.services.access_requests.request_edit_access(workspace_id, user.user_id).await?;
    Ok((StatusCode::CREATED, Json(AccessRequestEnvelope { access_request })))
}

pub(super) async fn list_access_requests(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<AccessRequestsEnvelope>, AppError> {
    let items = state.services.access_requests.list_pending(workspace_id, user.user_id).await?;
    Ok(Json(AccessRequestsEnvelope { items }))
}

pub(super) async fn approve_access_request(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((workspace_id, request_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AccessRequestEnvelope>, AppError> {
    let access_request =
        state.services.access_requests.approve(workspace_id, request_id, user.user_id).await?;
    Ok(Json(AccessRequestEnvelope { access_request }))
}

pub(super) async fn deny_access_request(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((workspace_id, request_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AccessRequestEnvelope>, AppError> {
    let access_request =
        state.services.access_requests.deny(workspace_id, request_id, user.user_id).await?;
    Ok(Json(AccessRequestEnvelope { access_request }))
}
