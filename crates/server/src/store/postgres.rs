use anyhow::anyhow;
use chrono::{DateTime, Utc};
use noteforge_common::types::{
    AccessRequest, AccessRequestStatus, Note, NoteType, WorkspaceMember, WorkspaceRole,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    ApprovalOutcome, NewNote, NewUser, NoteChanges, NoteFilter, ProfileChanges, ReachableWorkspace,
    StoreError, StoreResult, UniqueKey, UserRecord, WorkspaceRecord,
};
use crate::db::pool::check_pool_health;

const UNIQUE_VIOLATION: &str = "23505";

pub(super) fn map_sqlx_error(error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(database_error) = &error {
        if database_error.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let key = match database_error.constraint() {
                Some("users_email_key") => Some(UniqueKey::UserEmail),
                Some("users_username_key") => Some(UniqueKey::Username),
                Some("workspace_members_pkey") => Some(UniqueKey::Membership),
                Some("workspaces_invite_secret_key") => Some(UniqueKey::InviteSecret),
                Some("access_requests_one_pending_idx") => Some(UniqueKey::PendingAccessRequest),
                _ => None,
            };
            if let Some(key) = key {
                return StoreError::Duplicate(key);
            }
        }
    }

    StoreError::Backend(error.into())
}

fn parse_role(value: &str) -> StoreResult<WorkspaceRole> {
    WorkspaceRole::from_db_value(value)
        .ok_or_else(|| StoreError::Backend(anyhow!("invalid workspace role '{value}' in database")))
}

pub(super) async fn check_health(pool: &PgPool) -> StoreResult<()> {
    check_pool_health(pool).await.map_err(StoreError::Backend)
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    username: String,
    password_hash: String,
    profile_picture: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(value: UserRow) -> Self {
        Self {
            id: value.id,
            email: value.email,
            username: value.username,
            password_hash: value.password_hash,
            profile_picture: value.profile_picture,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct WorkspaceRow {
    id: Uuid,
    name: String,
    owner_id: Uuid,
    invite_secret: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WorkspaceRow> for WorkspaceRecord {
    fn from(value: WorkspaceRow) -> Self {
        Self {
            id: value.id,
            name: value.name,
            owner_id: value.owner_id,
            invite_secret: value.invite_secret,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReachableWorkspaceRow {
    id: Uuid,
    name: String,
    owner_id: Uuid,
    invite_secret: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    membership_role: Option<String>,
}

impl TryFrom<ReachableWorkspaceRow> for ReachableWorkspace {
    type Error = StoreError;

    fn try_from(value: ReachableWorkspaceRow) -> StoreResult<Self> {
        let membership_role = value.membership_role.as_deref().map(parse_role).transpose()?;
        Ok(Self {
            workspace: WorkspaceRecord {
                id: value.id,
                name: value.name,
                owner_id: value.owner_id,
                invite_secret: value.invite_secret,
                created_at: value.created_at,
                updated_at: value.updated_at,
            },
            membership_role,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    user_id: Uuid,
    email: String,
    username: String,
    role: String,
    joined_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for WorkspaceMember {
    type Error = StoreError;

    fn try_from(value: MemberRow) -> StoreResult<Self> {
        Ok(Self {
            user_id: value.user_id,
            email: value.email,
            username: value.username,
            role: parse_role(&value.role)?,
            joined_at: Some(value.joined_at),
        })
    }
}

#[derive(sqlx::FromRow)]
struct AccessRequestRow {
    id: Uuid,
    workspace_id: Uuid,
    user_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl TryFrom<AccessRequestRow> for AccessRequest {
    type Error = StoreError;

    fn try_from(value: AccessRequestRow) -> StoreResult<Self> {
        let status = AccessRequestStatus::from_db_value(&value.status).ok_or_else(|| {
            StoreError::Backend(anyhow!(
                "invalid access request status '{}' in database",
                value.status
            ))
        })?;
        Ok(Self {
            id: value.id,
            workspace_id: value.workspace_id,
            user_id: value.user_id,
            status,
            created_at: value.created_at,
            resolved_at: value.resolved_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct NoteRow {
    id: Uuid,
    workspace_id: Uuid,
    author_id: Uuid,
    title: String,
    content: String,
    summary: Option<String>,
    note_type: String,
    audio_file_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<NoteRow> for Note {
    type Error = StoreError;

    fn try_from(value: NoteRow) -> StoreResult<Self> {
        let note_type = NoteType::from_db_value(&value.note_type).ok_or_else(|| {
            StoreError::Backend(anyhow!("invalid note type '{}' in database", value.note_type))
        })?;
        Ok(Self {
            id: value.id,
            workspace_id: value.workspace_id,
            author_id: value.author_id,
            title: value.title,
            content: value.content,
            summary: value.summary,
            note_type,
            audio_file_id: value.audio_file_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, email, username, password_hash, profile_picture, created_at, updated_at";
const WORKSPACE_COLUMNS: &str = "id, name, owner_id, invite_secret, created_at, updated_at";
const ACCESS_REQUEST_COLUMNS: &str = "id, workspace_id, user_id, status, created_at, resolved_at";
const NOTE_COLUMNS: &str = "id, workspace_id, author_id, title, content, summary, note_type, \
     audio_file_id, created_at, updated_at";

pub(super) async fn insert_user(pool: &PgPool, user: NewUser) -> StoreResult<UserRecord> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        INSERT INTO users (email, username, password_hash)
        VALUES ($1, $2, $3)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user.email)
    .bind(user.username)
    .bind(user.password_hash)
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

pub(super) async fn user_by_id(pool: &PgPool, user_id: Uuid) -> StoreResult<Option<UserRecord>> {
    let row =
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(UserRecord::from))
}

pub(super) async fn user_by_email(pool: &PgPool, email: &str) -> StoreResult<Option<UserRecord>> {
    let row =
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(UserRecord::from))
}

pub(super) async fn list_users(pool: &PgPool) -> StoreResult<Vec<UserRecord>> {
    let rows = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, username ASC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(UserRecord::from).collect())
}

pub(super) async fn update_user_profile(
    pool: &PgPool,
    user_id: Uuid,
    changes: ProfileChanges,
) -> StoreResult<Option<UserRecord>> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        UPDATE users
        SET
            username = COALESCE($2, username),
            profile_picture = COALESCE($3, profile_picture),
            updated_at = now()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(changes.username)
    .bind(changes.profile_picture)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(UserRecord::from))
}

pub(super) async fn update_password_hash(
    pool: &PgPool,
    user_id: Uuid,
    password_hash: &str,
) -> StoreResult<bool> {
    let result = sqlx::query(
        "UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1",
    )
    .bind(user_id)
    .bind(password_hash)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(super) async fn insert_workspace(
    pool: &PgPool,
    name: &str,
    owner_id: Uuid,
    invite_secret: &str,
) -> StoreResult<WorkspaceRecord> {
    let row = sqlx::query_as::<_, WorkspaceRow>(&format!(
        r#"
        INSERT INTO workspaces (name, owner_id, invite_secret)
        VALUES ($1, $2, $3)
        RETURNING {WORKSPACE_COLUMNS}
        "#
    ))
    .bind(name)
    .bind(owner_id)
    .bind(invite_secret)
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

pub(super) async fn workspace_by_id(
    pool: &PgPool,
    workspace_id: Uuid,
) -> StoreResult<Option<WorkspaceRecord>> {
    let row = sqlx::query_as::<_, WorkspaceRow>(&format!(
        "SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE id = $1"
    ))
    .bind(workspace_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(WorkspaceRecord::from))
}

pub(super) async fn workspace_by_invite_secret(
    pool: &PgPool,
    invite_secret: &str,
) -> StoreResult<Option<WorkspaceRecord>> {
    let row = sqlx::query_as::<_, WorkspaceRow>(&format!(
        "SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE invite_secret = $1"
    ))
    .bind(invite_secret)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(WorkspaceRecord::from))
}

pub(super) async fn reachable_workspaces(
    pool: &PgPool,
    user_id: Uuid,
) -> StoreResult<Vec<ReachableWorkspace>> {
    sqlx::query_as::<_, ReachableWorkspaceRow>(
        r#"
        SELECT
            w.id,
            w.name,
            w.owner_id,
            w.invite_secret,
            w.created_at,
            w.updated_at,
            wm.role AS membership_role
        FROM workspaces AS w
        LEFT JOIN workspace_members AS wm
            ON wm.workspace_id = w.id
           AND wm.user_id = $1
        WHERE w.owner_id = $1
           OR wm.user_id IS NOT NULL
        ORDER BY w.created_at DESC, w.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(ReachableWorkspace::try_from)
    .collect()
}

pub(super) async fn rename_workspace(
    pool: &PgPool,
    workspace_id: Uuid,
    name: &str,
) -> StoreResult<Option<WorkspaceRecord>> {
    let row = sqlx::query_as::<_, WorkspaceRow>(&format!(
        r#"
        UPDATE workspaces
        SET name = $2, updated_at = now()
        WHERE id = $1
        RETURNING {WORKSPACE_COLUMNS}
        "#
    ))
    .bind(workspace_id)
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(WorkspaceRecord::from))
}

pub(super) async fn replace_invite_secret(
    pool: &PgPool,
    workspace_id: Uuid,
    invite_secret: &str,
) -> StoreResult<Option<WorkspaceRecord>> {
    let row = sqlx::query_as::<_, WorkspaceRow>(&format!(
        r#"
        UPDATE workspaces
        SET invite_secret = $2, updated_at = now()
        WHERE id = $1
        RETURNING {WORKSPACE_COLUMNS}
        "#
    ))
    .bind(workspace_id)
    .bind(invite_secret)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(WorkspaceRecord::from))
}

pub(super) async fn delete_workspace_cascade(pool: &PgPool, workspace_id: Uuid) -> StoreResult<bool> {
    let mut tx = pool.begin().await?;

    // Locking the parent row blocks concurrent child inserts until commit.
    let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM workspaces WHERE id = $1 FOR UPDATE")
        .bind(workspace_id)
        .fetch_optional(&mut *tx)
        .await?
        .is_some();
    if !exists {
        tx.rollback().await?;
        return Ok(false);
    }

    for statement in [
        "DELETE FROM access_requests WHERE workspace_id = $1",
        "DELETE FROM workspace_members WHERE workspace_id = $1",
        "DELETE FROM notes WHERE workspace_id = $1",
        "DELETE FROM workspaces WHERE id = $1",
    ] {
        sqlx::query(statement).bind(workspace_id).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(true)
}

pub(super) async fn membership_role(
    pool: &PgPool,
    workspace_id: Uuid,
    user_id: Uuid,
) -> StoreResult<Option<WorkspaceRole>> {
    sqlx::query_scalar::<_, String>(
        "SELECT role FROM workspace_members WHERE workspace_id = $1 AND user_id = $2",
    )
    .bind(workspace_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .as_deref()
    .map(parse_role)
    .transpose()
}

pub(super) async fn insert_membership(
    pool: &PgPool,
    workspace_id: Uuid,
    user_id: Uuid,
    role: WorkspaceRole,
) -> StoreResult<DateTime<Utc>> {
    let joined_at = sqlx::query_scalar::<_, DateTime<Utc>>(
        r#"
        INSERT INTO workspace_members (workspace_id, user_id, role)
        VALUES ($1, $2, $3)
        RETURNING joined_at
        "#,
    )
    .bind(workspace_id)
    .bind(user_id)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    Ok(joined_at)
}

pub(super) async fn update_membership_role(
    pool: &PgPool,
    workspace_id: Uuid,
    user_id: Uuid,
    role: WorkspaceRole,
) -> StoreResult<bool> {
    let result = sqlx::query(
        "UPDATE workspace_members SET role = $3 WHERE workspace_id = $1 AND user_id = $2",
    )
    .bind(workspace_id)
    .bind(user_id)
    .bind(role.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(super) async fn delete_membership(
    pool: &PgPool,
    workspace_id: Uuid,
    user_id: Uuid,
) -> StoreResult<bool> {
    let mut tx = pool.begin().await?;

    let removed =
        sqlx::query("DELETE FROM workspace_members WHERE workspace_id = $1 AND user_id = $2")
            .bind(workspace_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    if removed.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query(
        r#"
        UPDATE access_requests
        SET status = 'DENIED', resolved_at = now()
        WHERE workspace_id = $1
          AND user_id = $2
          AND status = 'PENDING'
        "#,
    )
    .bind(workspace_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(true)
}

pub(super) async fn list_memberships(
    pool: &PgPool,
    workspace_id: Uuid,
) -> StoreResult<Vec<WorkspaceMember>> {
    sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT
            wm.user_id,
            u.email,
            u.username,
            wm.role,
            wm.joined_at
        FROM workspace_members AS wm
        INNER JOIN users AS u
            ON u.id = wm.user_id
        WHERE wm.workspace_id = $1
        ORDER BY wm.joined_at ASC, wm.user_id ASC
        "#,
    )
    .bind(workspace_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(WorkspaceMember::try_from)
    .collect()
}

pub(super) async fn insert_access_request(
    pool: &PgPool,
    workspace_id: Uuid,
    user_id: Uuid,
) -> StoreResult<AccessRequest> {
    sqlx::query_as::<_, AccessRequestRow>(&format!(
        r#"
        INSERT INTO access_requests (workspace_id, user_id, status)
        VALUES ($1, $2, 'PENDING')
        RETURNING {ACCESS_REQUEST_COLUMNS}
        "#
    ))
    .bind(workspace_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?
    .try_into()
}

pub(super) async fn access_request_by_id(
    pool: &PgPool,
    request_id: Uuid,
) -> StoreResult<Option<AccessRequest>> {
    sqlx::query_as::<_, AccessRequestRow>(&format!(
        "SELECT {ACCESS_REQUEST_COLUMNS} FROM access_requests WHERE id = $1"
    ))
    .bind(request_id)
    .fetch_optional(pool)
    .await?
    .map(AccessRequest::try_from)
    .transpose()
}

pub(super) async fn pending_access_requests(
    pool: &PgPool,
    workspace_id: Uuid,
) -> StoreResult<Vec<AccessRequest>> {
    sqlx::query_as::<_, AccessRequestRow>(&format!(
        r#"
        SELECT {ACCESS_REQUEST_COLUMNS}
        FROM access_requests
        WHERE workspace_id = $1
          AND status = 'PENDING'
        ORDER BY created_at ASC, id ASC
        "#
    ))
    .bind(workspace_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(AccessRequest::try_from)
    .collect()
}

pub(super) async fn approve_access_request(
    pool: &PgPool,
    workspace_id: Uuid,
    request_id: Uuid,
) -> StoreResult<ApprovalOutcome> {
    let mut tx = pool.begin().await?;

    let Some(row) = sqlx::query_as::<_, AccessRequestRow>(&format!(
        r#"
        UPDATE access_requests
        SET status = 'APPROVED', resolved_at = now()
        WHERE id = $1
          AND workspace_id = $2
          AND status = 'PENDING'
        RETURNING {ACCESS_REQUEST_COLUMNS}
        "#
    ))
    .bind(request_id)
    .bind(workspace_id)
    .fetch_optional(&mut *tx)
    .await?
    else {
        tx.rollback().await?;
        return Ok(ApprovalOutcome::NotPending);
    };

    let upgraded = sqlx::query(
        r#"
        UPDATE workspace_members
        SET role = 'EDITOR'
        WHERE workspace_id = $1
          AND user_id = $2
          AND role = 'VIEWER'
        "#,
    )
    .bind(workspace_id)
    .bind(row.user_id)
    .execute(&mut *tx)
    .await?;
    if upgraded.rows_affected() == 0 {
        let current = sqlx::query_scalar::<_, String>(
            "SELECT role FROM workspace_members WHERE workspace_id = $1 AND user_id = $2",
        )
        .bind(workspace_id)
        .bind(row.user_id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.rollback().await?;
        return Ok(match current.as_deref().map(parse_role).transpose()? {
            Some(role) => ApprovalOutcome::RequesterNotViewer(role),
            None => ApprovalOutcome::RequesterNotMember,
        });
    }

    tx.commit().await?;
    Ok(ApprovalOutcome::Approved(row.try_into()?))
}

pub(super) async fn deny_access_request(
    pool: &PgPool,
    workspace_id: Uuid,
    request_id: Uuid,
) -> StoreResult<Option<AccessRequest>> {
    sqlx::query_as::<_, AccessRequestRow>(&format!(
        r#"
        UPDATE access_requests
        SET status = 'DENIED', resolved_at = now()
        WHERE id = $1
          AND workspace_id = $2
          AND status = 'PENDING'
        RETURNING {ACCESS_REQUEST_COLUMNS}
        "#
    ))
    .bind(request_id)
    .bind(workspace_id)
    .fetch_optional(pool)
    .await?
    .map(AccessRequest::try_from)
    .transpose()
}

pub(super) async fn insert_note(pool: &PgPool, note: NewNote) -> StoreResult<Note> {
    sqlx::query_as::<_, NoteRow>(&format!(
        r#"
        INSERT INTO notes (workspace_id, author_id, title, content, note_type, audio_file_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {NOTE_COLUMNS}
        "#
    ))
    .bind(note.workspace_id)
    .bind(note.author_id)
    .bind(note.title)
    .bind(note.content)
    .bind(note.note_type.as_str())
    .bind(note.audio_file_id)
    .fetch_one(pool)
    .await?
    .try_into()
}

pub(super) async fn note_by_id(pool: &PgPool, note_id: Uuid) -> StoreResult<Option<Note>> {
    sqlx::query_as::<_, NoteRow>(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1"))
        .bind(note_id)
        .fetch_optional(pool)
        .await?
        .map(Note::try_from)
        .transpose()
}

// `$1` is the workspace; `$2..=$4` are the optional filters, NULL when unset.
const NOTE_FILTER: &str = r#"
    workspace_id = $1
    AND ($2::uuid IS NULL OR author_id = $2)
    AND ($3::text IS NULL OR note_type = $3)
    AND ($4::text IS NULL OR title ILIKE $4 ESCAPE '\' OR content ILIKE $4 ESCAPE '\')
"#;

/// Wraps a search term for `ILIKE`, matching its wildcards literally.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

pub(super) async fn list_notes(
    pool: &PgPool,
    workspace_id: Uuid,
    filter: &NoteFilter,
    offset: u64,
    limit: u64,
) -> StoreResult<Vec<Note>> {
    sqlx::query_as::<_, NoteRow>(&format!(
        r#"
        SELECT {NOTE_COLUMNS}
        FROM notes
        WHERE {NOTE_FILTER}
        ORDER BY updated_at DESC, id DESC
        LIMIT $5 OFFSET $6
        "#
    ))
    .bind(workspace_id)
    .bind(filter.author_id)
    .bind(filter.note_type.map(NoteType::as_str))
    .bind(filter.search.as_deref().map(contains_pattern))
    .bind(i64::try_from(limit).unwrap_or(i64::MAX))
    .bind(i64::try_from(offset).unwrap_or(i64::MAX))
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(Note::try_from)
    .collect()
}

pub(super) async fn count_notes(
    pool: &PgPool,
    workspace_id: Uuid,
    filter: &NoteFilter,
) -> StoreResult<u64> {
    let count = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM notes WHERE {NOTE_FILTER}"
    ))
    .bind(workspace_id)
    .bind(filter.author_id)
    .bind(filter.note_type.map(NoteType::as_str))
    .bind(filter.search.as_deref().map(contains_pattern))
    .fetch_one(pool)
    .await?;

    Ok(count.max(0) as u64)
}

pub(super) async fn update_note(
    pool: &PgPool,
    note_id: Uuid,
    changes: NoteChanges,
) -> StoreResult<Option<Note>> {
    sqlx::query_as::<_, NoteRow>(&format!(
        r#"
        UPDATE notes
        SET
            title = COALESCE($2, title),
            content = COALESCE($3, content),
            updated_at = now()
        WHERE id = $1
        RETURNING {NOTE_COLUMNS}
        "#
    ))
    .bind(note_id)
    .bind(changes.title)
    .bind(changes.content)
    .fetch_optional(pool)
    .await?
    .map(Note::try_from)
    .transpose()
}

pub(super) async fn set_note_summary(
    pool: &PgPool,
    note_id: Uuid,
    summary: &str,
) -> StoreResult<Option<Note>> {
    sqlx::query_as::<_, NoteRow>(&format!(
        r#"
        UPDATE notes
        SET summary = $2, updated_at = now()
        WHERE id = $1
        RETURNING {NOTE_COLUMNS}
        "#
    ))
    .bind(note_id)
    .bind(summary)
    .fetch_optional(pool)
    .await?
    .map(Note::try_from)
    .transpose()
}

pub(super) async fn delete_note(pool: &PgPool, note_id: Uuid) -> StoreResult<bool> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1").bind(note_id).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}
