// Core domain types shared across the noteforge crates.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Permission tier a user holds inside a workspace.
///
/// The three tiers are fixed. A workspace's owner always resolves to
/// [`WorkspaceRole::Owner`] through the workspace's `owner_id`, whether or
/// not a membership row exists for them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceRole {
    Owner,
    Editor,
    Viewer,
}

impl WorkspaceRole {
    pub const ALL: [WorkspaceRole; 3] = [Self::Owner, Self::Editor, Self::Viewer];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Editor => "EDITOR",
            Self::Viewer => "VIEWER",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "OWNER" => Some(Self::Owner),
            "EDITOR" => Some(Self::Editor),
            "VIEWER" => Some(Self::Viewer),
            _ => None,
        }
    }
}

impl fmt::Display for WorkspaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown workspace role '{0}' (expected OWNER, EDITOR or VIEWER)")]
pub struct ParseRoleError(pub String);

impl FromStr for WorkspaceRole {
    type Err = ParseRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_db_value(&value.trim().to_ascii_uppercase())
            .ok_or_else(|| ParseRoleError(value.to_owned()))
    }
}

/// A workspace as seen by a specific caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    /// Only present when the caller resolves to OWNER.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite_secret: Option<String>,
    /// Caller's effective role in this workspace.
    pub role: WorkspaceRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of a workspace member listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceMember {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub role: WorkspaceRole,
    /// `None` for the owner, whose authority does not come from a row.
    pub joined_at: Option<DateTime<Utc>>,
}

/// A membership row as created by joining or being added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Membership {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub role: WorkspaceRole,
    pub joined_at: DateTime<Utc>,
}

/// Public view of a user account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessRequestStatus {
    Pending,
    Approved,
    Denied,
}

impl AccessRequestStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Denied => "DENIED",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "DENIED" => Some(Self::Denied),
            _ => None,
        }
    }
}

/// A viewer's request to be upgraded to editor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessRequest {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub status: AccessRequestStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoteType {
    #[default]
    Manual,
    VoiceTranscript,
    MeetingSummary,
}

impl NoteType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "MANUAL",
            Self::VoiceTranscript => "VOICE_TRANSCRIPT",
            Self::MeetingSummary => "MEETING_SUMMARY",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "MANUAL" => Some(Self::Manual),
            "VOICE_TRANSCRIPT" => Some(Self::VoiceTranscript),
            "MEETING_SUMMARY" => Some(Self::MeetingSummary),
            _ => None,
        }
    }
}

/// A note. Belongs to exactly one workspace and has exactly one author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    /// Opaque reference to an uploaded recording.
    pub audio_file_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::{NoteType, ParseRoleError, WorkspaceRole};

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!("editor".parse::<WorkspaceRole>(), Ok(WorkspaceRole::Editor));
        assert_eq!(" VIEWER ".parse::<WorkspaceRole>(), Ok(WorkspaceRole::Viewer));
        assert_eq!("admin".parse::<WorkspaceRole>(), Err(ParseRoleError("admin".to_owned())));
    }

    #[test]
    fn roles_serialize_as_upper_case_tags() {
        let json = serde_json::to_string(&WorkspaceRole::Owner).expect("role should serialize");
        assert_eq!(json, "\"OWNER\"");
        let parsed: WorkspaceRole =
            serde_json::from_str("\"VIEWER\"").expect("role should deserialize");
        assert_eq!(parsed, WorkspaceRole::Viewer);
    }

    #[test]
    fn db_values_match_serde_tags() {
        for role in WorkspaceRole::ALL {
            assert_eq!(WorkspaceRole::from_db_value(role.as_str()), Some(role));
        }
        assert_eq!(NoteType::from_db_value("VOICE_TRANSCRIPT"), Some(NoteType::VoiceTranscript));
        assert_eq!(NoteType::default(), NoteType::Manual);
    }
}
