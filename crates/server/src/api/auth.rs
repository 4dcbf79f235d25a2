use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use noteforge_common::types::UserProfile;
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::{
    auth::middleware::AuthenticatedUser,
    error::AppError,
    service::accounts::{AuthSession, ProfileUpdate, Registration},
    validation::ValidatedJson,
};

#[derive(Debug, Deserialize)]
pub(super) struct RegisterRequest {
    email: String,
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateProfileRequest {
    username: Option<String>,
    profile_picture: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PasswordResetRequest {
    email: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResetPasswordRequest {
    password: String,
    confirm_password: String,
}

#[derive(Debug, Serialize)]
pub(super) struct UserEnvelope {
    user: UserProfile,
}

#[derive(Debug, Serialize)]
pub(super) struct UsersEnvelope {
    items: Vec<UserProfile>,
}

pub(super) async fn register(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthSession>), AppError> {
    let session = state
        .services
        .accounts
        .register(Registration {
            email: payload.email,
            username: payload.username,
            password: payload.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub(super) async fn login(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthSession>, AppError> {
    let session = state.services.accounts.login(&payload.email, &payload.password).await?;
    Ok(Json(session))
}

pub(super) async fn me(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserEnvelope>, AppError> {
    let user = state.services.accounts.me(user.user_id).await?;
    Ok(Json(UserEnvelope { user }))
}

pub(super) async fn update_me(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<UserEnvelope>, AppError> {
    let user = state
        .services
        .accounts
        .update_profile(
            user.user_id,
            ProfileUpdate { username: payload.username, profile_picture: payload.profile_picture },
        )
        .await?;
    Ok(Json(UserEnvelope { user }))
}

pub(super) async fn list_users(
    State(state): State<ApiState>,
) -> Result<Json<UsersEnvelope>, AppError> {
    let items = state.services.accounts.list_users().await?;
    Ok(Json(UsersEnvelope { items }))
}

/// Always 202, whether or not the address has an account.
pub(super) async fn request_password_reset(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<PasswordResetRequest>,
) -> Result<StatusCode, AppError> {
    state.services.accounts.send_reset_password_email(&payload.email).await?;
    Ok(StatusCode::ACCEPTED)
}

pub(super) async fn reset_password(
    State(state): State<ApiState>,
    Path(token): Path<String>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    state
        .services
        .accounts
        .reset_password(&token, &payload.password, &payload.confirm_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
