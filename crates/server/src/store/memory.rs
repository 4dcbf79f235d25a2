use std::collections::HashMap;

use chrono::{DateTime, Utc};
use noteforge_common::types::{
    AccessRequest, AccessRequestStatus, Note, WorkspaceMember, WorkspaceRole,
};
use uuid::Uuid;

use super::{
    ApprovalOutcome, NewNote, NewUser, NoteChanges, NoteFilter, ProfileChanges, ReachableWorkspace,
    StoreError, StoreResult, UniqueKey, UserRecord, WorkspaceRecord,
};

/// In-process backend used by tests and by servers started without a
/// database URL. Callers hold the surrounding `RwLock` for the whole of
/// each operation, so every method here is atomic.
#[derive(Default)]
pub struct MemoryStore {
    users: HashMap<Uuid, UserRecord>,
    workspaces: HashMap<Uuid, WorkspaceRecord>,
    memberships: HashMap<(Uuid, Uuid), MemoryMembership>,
    access_requests: HashMap<Uuid, AccessRequest>,
    notes: HashMap<Uuid, Note>,
    // Insertion counter; breaks ties between rows written in the same instant.
    sequence: u64,
}

#[derive(Clone)]
struct MemoryMembership {
    role: WorkspaceRole,
    joined_at: DateTime<Utc>,
    sequence: u64,
}

impl MemoryStore {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub(super) fn insert_user(&mut self, user: NewUser) -> StoreResult<UserRecord> {
        if self.users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Duplicate(UniqueKey::UserEmail));
        }
        if self.users.values().any(|existing| existing.username == user.username) {
            return Err(StoreError::Duplicate(UniqueKey::Username));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            profile_picture: None,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(record.id, record.clone());
        Ok(record)
    }

    pub(super) fn user_by_id(&self, user_id: Uuid) -> Option<UserRecord> {
        self.users.get(&user_id).cloned()
    }

    pub(super) fn user_by_email(&self, email: &str) -> Option<UserRecord> {
        self.users.values().find(|user| user.email == email).cloned()
    }

    pub(super) fn list_users(&self) -> Vec<UserRecord> {
        let mut users: Vec<UserRecord> = self.users.values().cloned().collect();
        users.sort_by(|left, right| {
            left.created_at.cmp(&right.created_at).then_with(|| left.username.cmp(&right.username))
        });
        users
    }

    pub(super) fn update_user_profile(
        &mut self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> StoreResult<Option<UserRecord>> {
        if let Some(username) = changes.username.as_deref() {
            if self.users.values().any(|user| user.id != user_id && user.username == username) {
                return Err(StoreError::Duplicate(UniqueKey::Username));
            }
        }

        let Some(user) = self.users.get_mut(&user_id) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(profile_picture) = changes.profile_picture {
            user.profile_picture = Some(profile_picture);
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    pub(super) fn update_password_hash(&mut self, user_id: Uuid, password_hash: String) -> bool {
        let Some(user) = self.users.get_mut(&user_id) else {
            return false;
        };
        user.password_hash = password_hash;
        user.updated_at = Utc::now();
        true
    }

    pub(super) fn insert_workspace(
        &mut self,
        name: String,
        owner_id: Uuid,
        invite_secret: String,
    ) -> StoreResult<WorkspaceRecord> {
        if self.workspaces.values().any(|workspace| workspace.invite_secret == invite_secret) {
            return Err(StoreError::Duplicate(UniqueKey::InviteSecret));
        }

        let now = Utc::now();
        let record = WorkspaceRecord {
            id: Uuid::new_v4(),
            name,
            owner_id,
            invite_secret,
            created_at: now,
            updated_at: now,
        };
        self.workspaces.insert(record.id, record.clone());
        Ok(record)
    }

    pub(super) fn workspace_by_id(&self, workspace_id: Uuid) -> Option<WorkspaceRecord> {
        self.workspaces.get(&workspace_id).cloned()
    }

    pub(super) fn workspace_by_invite_secret(&self, invite_secret: &str) -> Option<WorkspaceRecord> {
        self.workspaces.values().find(|workspace| workspace.invite_secret == invite_secret).cloned()
    }

    pub(super) fn reachable_workspaces(&self, user_id: Uuid) -> Vec<ReachableWorkspace> {
        let mut items: Vec<ReachableWorkspace> = self
            .workspaces
            .values()
            .filter_map(|workspace| {
                let membership_role = self
                    .memberships
                    .get(&(workspace.id, user_id))
                    .map(|membership| membership.role);
                if workspace.owner_id != user_id && membership_role.is_none() {
                    return None;
                }
                Some(ReachableWorkspace { workspace: workspace.clone(), membership_role })
            })
            .collect();

        items.sort_by(|left, right| {
            right
                .workspace
                .created_at
                .cmp(&left.workspace.created_at)
                .then_with(|| right.workspace.id.cmp(&left.workspace.id))
        });
        items
    }

    pub(super) fn rename_workspace(
        &mut self,
        workspace_id: Uuid,
        name: String,
    ) -> Option<WorkspaceRecord> {
        let workspace = self.workspaces.get_mut(&workspace_id)?;
        workspace.name = name;
        workspace.updated_at = Utc::now();
        Some(workspace.clone())
    }

    pub(super) fn replace_invite_secret(
        &mut self,
        workspace_id: Uuid,
        invite_secret: String,
    ) -> StoreResult<Option<WorkspaceRecord>> {
        if self
            .workspaces
            .values()
            .any(|workspace| workspace.id != workspace_id && workspace.invite_secret == invite_secret)
        {
            return Err(StoreError::Duplicate(UniqueKey::InviteSecret));
        }

        let Some(workspace) = self.workspaces.get_mut(&workspace_id) else {
            return Ok(None);
        };
        workspace.invite_secret = invite_secret;
        workspace.updated_at = Utc::now();
        Ok(Some(workspace.clone()))
    }

    pub(super) fn delete_workspace_cascade(&mut self, workspace_id: Uuid) -> bool {
        if !self.workspaces.contains_key(&workspace_id) {
            return false;
        }

        self.access_requests.retain(|_, request| request.workspace_id != workspace_id);
        self.memberships.retain(|(member_workspace_id, _), _| *member_workspace_id != workspace_id);
        self.notes.retain(|_, note| note.workspace_id != workspace_id);
        self.workspaces.remove(&workspace_id);
        true
    }

    pub(super) fn membership_role(&self, workspace_id: Uuid, user_id: Uuid) -> Option<WorkspaceRole> {
        self.memberships.get(&(workspace_id, user_id)).map(|membership| membership.role)
    }

    pub(super) fn insert_membership(
        &mut self,
        workspace_id: Uuid,
        user_id: Uuid,
        role: WorkspaceRole,
    ) -> StoreResult<DateTime<Utc>> {
        if self.memberships.contains_key(&(workspace_id, user_id)) {
            return Err(StoreError::Duplicate(UniqueKey::Membership));
        }

        let joined_at = Utc::now();
        let sequence = self.next_sequence();
        self.memberships
            .insert((workspace_id, user_id), MemoryMembership { role, joined_at, sequence });
        Ok(joined_at)
    }

    pub(super) fn update_membership_role(
        &mut self,
        workspace_id: Uuid,
        user_id: Uuid,
        role: WorkspaceRole,
    ) -> bool {
        match self.memberships.get_mut(&(workspace_id, user_id)) {
            Some(membership) => {
                membership.role = role;
                true
            }
            None => false,
        }
    }

    pub(super) fn delete_membership(&mut self, workspace_id: Uuid, user_id: Uuid) -> bool {
        if self.memberships.remove(&(workspace_id, user_id)).is_none() {
            return false;
        }

        let now = Utc::now();
        for request in self.access_requests.values_mut().filter(|request| {
            request.workspace_id == workspace_id
                && request.user_id == user_id
                && request.status == AccessRequestStatus::Pending
        }) {
            request.status = AccessRequestStatus::Denied;
            request.resolved_at = Some(now);
        }
        true
    }

    pub(super) fn list_memberships(&self, workspace_id: Uuid) -> Vec<WorkspaceMember> {
        let mut rows: Vec<(u64, WorkspaceMember)> = self
            .memberships
            .iter()
            .filter(|((member_workspace_id, _), _)| *member_workspace_id == workspace_id)
            .filter_map(|((_, user_id), membership)| {
                let user = self.users.get(user_id)?;
                Some((
                    membership.sequence,
                    WorkspaceMember {
                        user_id: user.id,
                        email: user.email.clone(),
                        username: user.username.clone(),
                        role: membership.role,
                        joined_at: Some(membership.joined_at),
                    },
                ))
            })
            .collect();

        rows.sort_by_key(|(sequence, _)| *sequence);
        rows.into_iter().map(|(_, member)| member).collect()
    }

    pub(super) fn insert_access_request(
        &mut self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<AccessRequest> {
        if self.access_requests.values().any(|request| {
            request.workspace_id == workspace_id
                && request.user_id == user_id
                && request.status == AccessRequestStatus::Pending
        }) {
            return Err(StoreError::Duplicate(UniqueKey::PendingAccessRequest));
        }

        let request = AccessRequest {
            id: Uuid::new_v4(),
            workspace_id,
            user_id,
            status: AccessRequestStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        };
        self.access_requests.insert(request.id, request.clone());
        Ok(request)
    }

    pub(super) fn access_request_by_id(&self, request_id: Uuid) -> Option<AccessRequest> {
        self.access_requests.get(&request_id).cloned()
    }

    pub(super) fn pending_access_requests(&self, workspace_id: Uuid) -> Vec<AccessRequest> {
        let mut requests: Vec<AccessRequest> = self
            .access_requests
            .values()
            .filter(|request| {
                request.workspace_id == workspace_id && request.status == AccessRequestStatus::Pending
            })
            .cloned()
            .collect();
        requests.sort_by(|left, right| {
            left.created_at.cmp(&right.created_at).then_with(|| left.id.cmp(&right.id))
        });
        requests
    }

    fn pending_request_mut(
        &mut self,
        workspace_id: Uuid,
        request_id: Uuid,
    ) -> Option<&mut AccessRequest> {
        self.access_requests.get_mut(&request_id).filter(|request| {
            request.workspace_id == workspace_id && request.status == AccessRequestStatus::Pending
        })
    }

    pub(super) fn approve_access_request(
        &mut self,
        workspace_id: Uuid,
        request_id: Uuid,
    ) -> ApprovalOutcome {
        let Some(requester_id) =
            self.pending_request_mut(workspace_id, request_id).map(|request| request.user_id)
        else {
            return ApprovalOutcome::NotPending;
        };
        match self.membership_role(workspace_id, requester_id) {
            None => return ApprovalOutcome::RequesterNotMember,
            Some(WorkspaceRole::Viewer) => {}
            Some(role) => return ApprovalOutcome::RequesterNotViewer(role),
        }
        self.update_membership_role(workspace_id, requester_id, WorkspaceRole::Editor);

        match self.pending_request_mut(workspace_id, request_id) {
            Some(request) => {
                request.status = AccessRequestStatus::Approved;
                request.resolved_at = Some(Utc::now());
                ApprovalOutcome::Approved(request.clone())
            }
            None => ApprovalOutcome::NotPending,
        }
    }

    pub(super) fn deny_access_request(
        &mut self,
        workspace_id: Uuid,
        request_id: Uuid,
    ) -> Option<AccessRequest> {
        let request = self.pending_request_mut(workspace_id, request_id)?;
        request.status = AccessRequestStatus::Denied;
        request.resolved_at = Some(Utc::now());
        Some(request.clone())
    }

    pub(super) fn insert_note(&mut self, note: NewNote) -> Note {
        let now = Utc::now();
        let record = Note {
            id: Uuid::new_v4(),
            workspace_id: note.workspace_id,
            author_id: note.author_id,
            title: note.title,
            content: note.content,
            summary: None,
            note_type: note.note_type,
            audio_file_id: note.audio_file_id,
            created_at: now,
            updated_at: now,
        };
        self.notes.insert(record.id, record.clone());
        record
    }

    pub(super) fn note_by_id(&self, note_id: Uuid) -> Option<Note> {
        self.notes.get(&note_id).cloned()
    }

    fn matching_notes<'a>(
        &'a self,
        workspace_id: Uuid,
        filter: &'a NoteFilter,
    ) -> impl Iterator<Item = &'a Note> + 'a {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        self.notes.values().filter(move |note| {
            note.workspace_id == workspace_id
                && filter.author_id.is_none_or(|author_id| note.author_id == author_id)
                && filter.note_type.is_none_or(|note_type| note.note_type == note_type)
                && needle.as_deref().is_none_or(|needle| {
                    note.title.to_lowercase().contains(needle)
                        || note.content.to_lowercase().contains(needle)
                })
        })
    }

    pub(super) fn list_notes(
        &self,
        workspace_id: Uuid,
        filter: &NoteFilter,
        offset: u64,
        limit: u64,
    ) -> Vec<Note> {
        let mut notes: Vec<&Note> = self.matching_notes(workspace_id, filter).collect();
        notes.sort_by(|left, right| {
            right.updated_at.cmp(&left.updated_at).then_with(|| right.id.cmp(&left.id))
        });
        notes
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    pub(super) fn count_notes(&self, workspace_id: Uuid, filter: &NoteFilter) -> u64 {
        self.matching_notes(workspace_id, filter).count() as u64
    }

    pub(super) fn update_note(&mut self, note_id: Uuid, changes: NoteChanges) -> Option<Note> {
        let note = self.notes.get_mut(&note_id)?;
        if let Some(title) = changes.title {
            note.title = title;
        }
        if let Some(content) = changes.content {
            note.content = content;
        }
        note.updated_at = Utc::now();
        Some(note.clone())
    }

    pub(super) fn set_note_summary(&mut self, note_id: Uuid, summary: String) -> Option<Note> {
        let note = self.notes.get_mut(&note_id)?;
        note.summary = Some(summary);
        note.updated_at = Utc::now();
        Some(note.clone())
    }

    pub(super) fn delete_note(&mut self, note_id: Uuid) -> bool {
        self.notes.remove(&note_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use noteforge_common::types::{AccessRequestStatus, NoteType, WorkspaceRole};
    use uuid::Uuid;

    use super::MemoryStore;
    use crate::store::{ApprovalOutcome, NewNote, NewUser, NoteFilter, StoreError, UniqueKey};

    fn new_user(store: &mut MemoryStore, name: &str) -> Uuid {
        store
            .insert_user(NewUser {
                email: format!("{name}@example.com"),
                username: name.to_owned(),
                password_hash: "$argon2id$stub".to_owned(),
            })
            .expect("user should insert")
            .id
    }

    #[test]
    fn duplicate_email_and_username_are_rejected() {
        let mut store = MemoryStore::default();
        new_user(&mut store, "ada");

        let same_email = store.insert_user(NewUser {
            email: "ada@example.com".to_owned(),
            username: "ada2".to_owned(),
            password_hash: String::new(),
        });
        assert!(matches!(same_email, Err(StoreError::Duplicate(UniqueKey::UserEmail))));

        let same_username = store.insert_user(NewUser {
            email: "other@example.com".to_owned(),
            username: "ada".to_owned(),
            password_hash: String::new(),
        });
        assert!(matches!(same_username, Err(StoreError::Duplicate(UniqueKey::Username))));
    }

    #[test]
    fn membership_insert_never_upserts() {
        let mut store = MemoryStore::default();
        let owner = new_user(&mut store, "owner");
        let member = new_user(&mut store, "member");
        let workspace = store
            .insert_workspace("Team".to_owned(), owner, "a".repeat(32))
            .expect("workspace should insert");

        store
            .insert_membership(workspace.id, member, WorkspaceRole::Viewer)
            .expect("first insert should succeed");
        let second = store.insert_membership(workspace.id, member, WorkspaceRole::Editor);

        assert!(matches!(second, Err(StoreError::Duplicate(UniqueKey::Membership))));
        assert_eq!(store.membership_role(workspace.id, member), Some(WorkspaceRole::Viewer));
    }

    #[test]
    fn invite_secrets_are_unique_across_workspaces() {
        let mut store = MemoryStore::default();
        let owner = new_user(&mut store, "owner");
        let first = store
            .insert_workspace("One".to_owned(), owner, "a".repeat(32))
            .expect("workspace should insert");
        let second = store
            .insert_workspace("Two".to_owned(), owner, "b".repeat(32))
            .expect("workspace should insert");

        assert!(matches!(
            store.insert_workspace("Three".to_owned(), owner, "a".repeat(32)),
            Err(StoreError::Duplicate(UniqueKey::InviteSecret))
        ));
        assert!(matches!(
            store.replace_invite_secret(second.id, first.invite_secret.clone()),
            Err(StoreError::Duplicate(UniqueKey::InviteSecret))
        ));
        assert_eq!(
            store.workspace_by_id(second.id).map(|workspace| workspace.invite_secret),
            Some("b".repeat(32))
        );
    }

    #[test]
    fn cascade_removes_every_dependent_row() {
        let mut store = MemoryStore::default();
        let owner = new_user(&mut store, "owner");
        let member = new_user(&mut store, "member");
        let doomed = store
            .insert_workspace("Doomed".to_owned(), owner, "a".repeat(32))
            .expect("workspace should insert");
        let kept = store
            .insert_workspace("Kept".to_owned(), owner, "b".repeat(32))
            .expect("workspace should insert");

        for workspace_id in [doomed.id, kept.id] {
            store
                .insert_membership(workspace_id, member, WorkspaceRole::Viewer)
                .expect("membership should insert");
            store.insert_access_request(workspace_id, member).expect("request should insert");
            store.insert_note(NewNote {
                workspace_id,
                author_id: owner,
                title: "Standup".to_owned(),
                content: "notes".to_owned(),
                note_type: NoteType::Manual,
                audio_file_id: None,
            });
        }

        assert!(store.delete_workspace_cascade(doomed.id));

        assert!(store.workspace_by_id(doomed.id).is_none());
        assert!(store.list_memberships(doomed.id).is_empty());
        assert_eq!(store.count_notes(doomed.id, &NoteFilter::default()), 0);
        assert!(store.pending_access_requests(doomed.id).is_empty());

        assert_eq!(store.list_memberships(kept.id).len(), 1);
        assert_eq!(store.count_notes(kept.id, &NoteFilter::default()), 1);
        assert_eq!(store.pending_access_requests(kept.id).len(), 1);

        assert!(!store.delete_workspace_cascade(doomed.id));
    }

    #[test]
    fn approval_upgrades_membership_or_changes_nothing() {
        let mut store = MemoryStore::default();
        let owner = new_user(&mut store, "owner");
        let viewer = new_user(&mut store, "viewer");
        let stranger = new_user(&mut store, "stranger");
        let workspace = store
            .insert_workspace("Team".to_owned(), owner, "a".repeat(32))
            .expect("workspace should insert");
        store
            .insert_membership(workspace.id, viewer, WorkspaceRole::Viewer)
            .expect("membership should insert");
        let request =
            store.insert_access_request(workspace.id, viewer).expect("request should insert");
        let orphan =
            store.insert_access_request(workspace.id, stranger).expect("request should insert");

        assert_eq!(
            store.approve_access_request(workspace.id, orphan.id),
            ApprovalOutcome::RequesterNotMember
        );
        assert_eq!(store.pending_access_requests(workspace.id).len(), 2);

        let ApprovalOutcome::Approved(approved) =
            store.approve_access_request(workspace.id, request.id)
        else {
            panic!("pending request should be approved");
        };
        assert_eq!(approved.status, AccessRequestStatus::Approved);
        assert!(approved.resolved_at.is_some());
        assert_eq!(store.membership_role(workspace.id, viewer), Some(WorkspaceRole::Editor));

        assert_eq!(
            store.approve_access_request(workspace.id, request.id),
            ApprovalOutcome::NotPending
        );
    }

    #[test]
    fn approval_never_touches_a_role_above_viewer() {
        let mut store = MemoryStore::default();
        let owner = new_user(&mut store, "owner");
        let member = new_user(&mut store, "member");
        let workspace = store
            .insert_workspace("Team".to_owned(), owner, "a".repeat(32))
            .expect("workspace should insert");
        store
            .insert_membership(workspace.id, member, WorkspaceRole::Viewer)
            .expect("membership should insert");
        let request =
            store.insert_access_request(workspace.id, member).expect("request should insert");
        store.update_membership_role(workspace.id, member, WorkspaceRole::Owner);

        assert_eq!(
            store.approve_access_request(workspace.id, request.id),
            ApprovalOutcome::RequesterNotViewer(WorkspaceRole::Owner)
        );
        assert_eq!(store.membership_role(workspace.id, member), Some(WorkspaceRole::Owner));
        assert_eq!(
            store.access_request_by_id(request.id).map(|request| request.status),
            Some(AccessRequestStatus::Pending)
        );
    }

    #[test]
    fn removing_a_member_denies_their_pending_requests() {
        let mut store = MemoryStore::default();
        let owner = new_user(&mut store, "owner");
        let leaving = new_user(&mut store, "leaving");
        let staying = new_user(&mut store, "staying");
        let workspace = store
            .insert_workspace("Team".to_owned(), owner, "a".repeat(32))
            .expect("workspace should insert");
        for user in [leaving, staying] {
            store
                .insert_membership(workspace.id, user, WorkspaceRole::Viewer)
                .expect("membership should insert");
        }
        let stale =
            store.insert_access_request(workspace.id, leaving).expect("request should insert");
        let live =
            store.insert_access_request(workspace.id, staying).expect("request should insert");

        assert!(store.delete_membership(workspace.id, leaving));

        let stale = store.access_request_by_id(stale.id).expect("request should remain");
        assert_eq!(stale.status, AccessRequestStatus::Denied);
        assert!(stale.resolved_at.is_some());
        let pending: Vec<Uuid> =
            store.pending_access_requests(workspace.id).into_iter().map(|request| request.id).collect();
        assert_eq!(pending, [live.id]);

        store
            .insert_membership(workspace.id, leaving, WorkspaceRole::Viewer)
            .expect("rejoin should insert");
        assert_eq!(
            store.approve_access_request(workspace.id, stale.id),
            ApprovalOutcome::NotPending
        );
        assert_eq!(store.membership_role(workspace.id, leaving), Some(WorkspaceRole::Viewer));
        assert!(!store.delete_membership(workspace.id, owner));
    }

    #[test]
    fn note_listing_filters_pages_and_counts() {
        let mut store = MemoryStore::default();
        let owner = new_user(&mut store, "owner");
        let editor = new_user(&mut store, "editor");
        let workspace = store
            .insert_workspace("Team".to_owned(), owner, "a".repeat(32))
            .expect("workspace should insert");
        let other = store
            .insert_workspace("Other".to_owned(), owner, "b".repeat(32))
            .expect("workspace should insert");
        let drafts = [
            (workspace.id, owner, "Quarterly Roadmap", "plans", NoteType::Manual),
            (workspace.id, editor, "Standup", "the ROADMAP slipped", NoteType::MeetingSummary),
            (workspace.id, editor, "Voice memo", "call the vendor", NoteType::VoiceTranscript),
            (other.id, owner, "Roadmap elsewhere", "", NoteType::Manual),
        ];
        for (workspace_id, author_id, title, content, note_type) in drafts {
            store.insert_note(NewNote {
                workspace_id,
                author_id,
                title: title.to_owned(),
                content: content.to_owned(),
                note_type,
                audio_file_id: None,
            });
        }

        let everything = NoteFilter::default();
        assert_eq!(store.count_notes(workspace.id, &everything), 3);
        assert_eq!(store.list_notes(workspace.id, &everything, 0, 2).len(), 2);
        assert_eq!(store.list_notes(workspace.id, &everything, 2, 2).len(), 1);
        assert!(store.list_notes(workspace.id, &everything, 3, 2).is_empty());

        let search = NoteFilter { search: Some("roadmap".to_owned()), ..NoteFilter::default() };
        let mut titles: Vec<String> = store
            .list_notes(workspace.id, &search, 0, 10)
            .into_iter()
            .map(|note| note.title)
            .collect();
        titles.sort();
        assert_eq!(titles, ["Quarterly Roadmap", "Standup"]);
        assert_eq!(store.count_notes(workspace.id, &search), 2);

        let by_editor = NoteFilter {
            author_id: Some(editor),
            note_type: Some(NoteType::VoiceTranscript),
            ..NoteFilter::default()
        };
        let listed = store.list_notes(workspace.id, &by_editor, 0, 10);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Voice memo");
    }

    #[test]
    fn one_pending_request_per_member() {
        let mut store = MemoryStore::default();
        let owner = new_user(&mut store, "owner");
        let viewer = new_user(&mut store, "viewer");
        let workspace = store
            .insert_workspace("Team".to_owned(), owner, "a".repeat(32))
            .expect("workspace should insert");

        let first = store.insert_access_request(workspace.id, viewer).expect("request should insert");
        assert!(matches!(
            store.insert_access_request(workspace.id, viewer),
            Err(StoreError::Duplicate(UniqueKey::PendingAccessRequest))
        ));

        store.deny_access_request(workspace.id, first.id).expect("request should be denied");
        assert!(store.insert_access_request(workspace.id, viewer).is_ok());
        assert!(store.deny_access_request(Uuid::new_v4(), first.id).is_none());
    }

    #[test]
    fn memberships_list_in_join_order() {
        let mut store = MemoryStore::default();
        let owner = new_user(&mut store, "owner");
        let workspace = store
            .insert_workspace("Team".to_owned(), owner, "a".repeat(32))
            .expect("workspace should insert");
        let names = ["carol", "alice", "bob"];
        for name in names {
            let user = new_user(&mut store, name);
            store
                .insert_membership(workspace.id, user, WorkspaceRole::Viewer)
                .expect("membership should insert");
        }

        let listed: Vec<String> = store
            .list_memberships(workspace.id)
            .into_iter()
            .map(|member| member.username)
            .collect();
        assert_eq!(listed, names);
    }
}
