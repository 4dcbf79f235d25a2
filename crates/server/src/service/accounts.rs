use std::sync::Arc;

use anyhow::anyhow;
use noteforge_common::types::UserProfile;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::{password::CredentialHasher, tokens::TokenService},
    error::AppError,
    mailer::{Mailer, ResetEmail},
    store::{NewUser, ProfileChanges, Store},
    validation,
};

/// Session token plus the profile it was issued for.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Clone)]
pub struct AccountService {
    store: Store,
    tokens: Arc<TokenService>,
    hasher: Arc<dyn CredentialHasher>,
    mailer: Arc<dyn Mailer>,
    reset_link_base_url: String,
}

impl AccountService {
    pub fn new(
        store: Store,
        tokens: Arc<TokenService>,
        hasher: Arc<dyn CredentialHasher>,
        mailer: Arc<dyn Mailer>,
        reset_link_base_url: impl Into<String>,
    ) -> Self {
        Self { store, tokens, hasher, mailer, reset_link_base_url: reset_link_base_url.into() }
    }

    pub async fn register(&self, registration: Registration) -> Result<AuthSession, AppError> {
        let email = validation::email(&registration.email)?;
        let username = validation::username(&registration.username)?;
        validation::password(&registration.password)?;

        let password_hash = self.hash_password(registration.password).await?;
        let user = self.store.insert_user(NewUser { email, username, password_hash }).await?;
        tracing::info!(user_id = %user.id, "user registered");

        self.session_for(user.into_profile())
    }

    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let Ok(email) = validation::email(email) else {
            return Err(AppError::InvalidCredentials);
        };
        let Some(user) = self.store.user_by_email(&email).await? else {
            tracing::debug!("login attempt for unknown email");
            return Err(AppError::InvalidCredentials);
        };
        if !self.verify_password(password, user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.id, "login attempt with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        self.session_for(user.into_profile())
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        self.store
            .user_by_id(user_id)
            .await?
            .map(|user| user.into_profile())
            .ok_or(AppError::NotFound("user not found"))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<UserProfile, AppError> {
        if update.username.is_none() && update.profile_picture.is_none() {
            return Err(AppError::validation("no profile fields to update"));
        }
        let changes = ProfileChanges {
            username: update.username.as_deref().map(validation::username).transpose()?,
            profile_picture: update
                .profile_picture
                .as_deref()
                .map(validation::profile_picture)
                .transpose()?,
        };

        self.store
            .update_user_profile(user_id, changes)
            .await?
            .map(|user| user.into_profile())
            .ok_or(AppError::NotFound("user not found"))
    }

    pub async fn list_users(&self) -> Result<Vec<UserProfile>, AppError> {
        Ok(self.store.list_users().await?.into_iter().map(|user| user.into_profile()).collect())
    }

    /// Succeeds whether or not the address belongs to an account. Only a
    /// store outage, which is independent of the address, surfaces as an error.
    pub async fn send_reset_password_email(&self, email: &str) -> Result<(), AppError> {
        let Ok(email) = validation::email(email) else {
            tracing::debug!("password reset requested for malformed email");
            return Ok(());
        };
        let Some(user) = self.store.user_by_email(&email).await? else {
            tracing::debug!("password reset requested for unknown email");
            return Ok(());
        };

        let token = match self.tokens.issue_reset_token(user.id) {
            Ok(token) => token,
            Err(error) => {
                tracing::error!(user_id = %user.id, error = ?error, "failed to issue reset token");
                return Ok(());
            }
        };
        let reset_url = format!("{}/{token}", self.reset_link_base_url.trim_end_matches('/'));

        if let Err(error) =
            self.mailer.send_password_reset(ResetEmail { to: user.email, reset_url }).await
        {
            tracing::warn!(user_id = %user.id, error = ?error, "failed to send reset email");
        }
        Ok(())
    }

    /// Every token failure collapses into `Unauthorized`. The token stays
    /// usable until it expires.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AppError> {
        validation::password(new_password)?;
        if new_password != confirm_password {
            return Err(AppError::validation("passwords do not match"));
        }

        let claims = self.tokens.verify_reset(token).map_err(|reason| {
            tracing::debug!(%reason, "rejected password reset token");
            AppError::Unauthorized
        })?;

        let password_hash = self.hash_password(new_password.to_owned()).await?;
        if !self.store.update_password_hash(claims.user_id, password_hash).await? {
            return Err(AppError::NotFound("user not found"));
        }
        tracing::info!(user_id = %claims.user_id, "password reset");
        Ok(())
    }

    // Argon2 hashing blocks; run it off the async workers.
    async fn hash_password(&self, plaintext: String) -> Result<String, AppError> {
        let hasher = Arc::clone(&self.hasher);
        let digest = tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|error| anyhow!("password hashing task failed: {error}"))??;
        Ok(digest)
    }

    async fn verify_password(&self, plaintext: &str, digest: String) -> Result<bool, AppError> {
        let hasher = Arc::clone(&self.hasher);
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &digest))
            .await
            .map_err(|error| AppError::Internal(anyhow!("password verification task failed: {error}")))
    }

    fn session_for(&self, user: UserProfile) -> Result<AuthSession, AppError> {
        let token = self.tokens.issue_session_token(user.id, &user.email, &user.username)?;
        Ok(AuthSession { token, user })
    }
}
