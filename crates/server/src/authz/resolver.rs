use noteforge_common::types::WorkspaceRole;
use uuid::Uuid;

use crate::{
    error::AppError,
    store::{Store, WorkspaceRecord},
};

/// Effective role of `user_id` given the workspace row and whatever
/// membership row exists for them.
///
/// Ownership comes from `workspace.owner_id` alone. A membership row for
/// the owner, whatever its role, is never consulted.
pub fn effective_role(
    workspace: &WorkspaceRecord,
    user_id: Uuid,
    membership_role: Option<WorkspaceRole>,
) -> Option<WorkspaceRole> {
    if workspace.owner_id == user_id {
        return Some(WorkspaceRole::Owner);
    }
    membership_role
}

/// A workspace together with the caller's resolved role, `None` meaning
/// the caller is not a member.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub workspace: WorkspaceRecord,
    pub role: Option<WorkspaceRole>,
}

/// Loads the workspace and resolves the caller's role in it.
///
/// Fails with `NotFound` when the workspace does not exist. The membership
/// table is only read for non-owners.
pub async fn resolve(
    store: &Store,
    workspace_id: Uuid,
    user_id: Uuid,
) -> Result<Resolution, AppError> {
    let workspace = store
        .workspace_by_id(workspace_id)
        .await?
        .ok_or(AppError::NotFound("workspace not found"))?;

    if workspace.owner_id == user_id {
        return Ok(Resolution { workspace, role: Some(WorkspaceRole::Owner) });
    }

    let membership_role = store.membership_role(workspace_id, user_id).await?;
    let role = effective_role(&workspace, user_id, membership_role);
    Ok(Resolution { workspace, role })
}

pub async fn resolve_role(
    store: &Store,
    workspace_id: Uuid,
    user_id: Uuid,
) -> Result<Option<WorkspaceRole>, AppError> {
    Ok(resolve(store, workspace_id, user_id).await?.role)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use noteforge_common::types::WorkspaceRole;
    use uuid::Uuid;

    use super::{effective_role, resolve_role};
    use crate::{
        error::AppError,
        store::{NewUser, Store, WorkspaceRecord},
    };

    fn workspace_owned_by(owner_id: Uuid) -> WorkspaceRecord {
        WorkspaceRecord {
            id: Uuid::new_v4(),
            name: "Team X".to_owned(),
            owner_id,
            invite_secret: "0".repeat(32),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owner_wins_over_any_membership_row() {
        let owner = Uuid::new_v4();
        let workspace = workspace_owned_by(owner);

        for row in [None, Some(WorkspaceRole::Viewer), Some(WorkspaceRole::Editor)] {
            assert_eq!(effective_role(&workspace, owner, row), Some(WorkspaceRole::Owner));
        }
    }

    #[test]
    fn non_owner_gets_row_role_or_nothing() {
        let workspace = workspace_owned_by(Uuid::new_v4());
        let user = Uuid::new_v4();

        assert_eq!(effective_role(&workspace, user, None), None);
        assert_eq!(
            effective_role(&workspace, user, Some(WorkspaceRole::Editor)),
            Some(WorkspaceRole::Editor)
        );
        assert_eq!(
            effective_role(&workspace, user, Some(WorkspaceRole::Owner)),
            Some(WorkspaceRole::Owner)
        );
    }

    #[tokio::test]
    async fn resolving_against_store() {
        let store = Store::memory();
        let owner = store
            .insert_user(NewUser {
                email: "owner@example.com".to_owned(),
                username: "owner".to_owned(),
                password_hash: String::new(),
            })
            .await
            .expect("user should insert");
        let workspace = store
            .insert_workspace("Team X".to_owned(), owner.id, "f".repeat(32))
            .await
            .expect("workspace should insert");
        let stranger = Uuid::new_v4();

        assert_eq!(
            resolve_role(&store, workspace.id, owner.id).await.expect("resolves"),
            Some(WorkspaceRole::Owner)
        );
        assert_eq!(resolve_role(&store, workspace.id, stranger).await.expect("resolves"), None);
        assert!(matches!(
            resolve_role(&store, Uuid::new_v4(), owner.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
