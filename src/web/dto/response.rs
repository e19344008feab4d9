//! Response DTOs for the HTTP API.

use serde::Serialize;

use crate::auth::AccountProfile;
use crate::mail::{Folder, FolderChange, MailboxView, Message, Transition};

// ============================================================================
// Generic Response Wrapper
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// Account DTOs
// ============================================================================

/// Registration result.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub email: String,
}

/// Login result.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Access token (JWT).
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: &'static str,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Account profile.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub profile_picture: Option<String>,
    pub created_at: String,
}

impl From<AccountProfile> for AccountResponse {
    fn from(p: AccountProfile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            first_name: p.first_name,
            middle_name: p.middle_name,
            last_name: p.last_name,
            profile_picture: p.profile_picture,
            created_at: p.created_at,
        }
    }
}

// ============================================================================
// Mail DTOs
// ============================================================================

/// A message record.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub is_read: bool,
    pub is_favorite: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            sender: m.sender,
            recipient: m.recipient,
            subject: m.subject,
            body: m.body,
            is_read: m.is_read,
            is_favorite: m.is_favorite,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A message with the folder it is filed in.
#[derive(Debug, Serialize)]
pub struct MessageDetailResponse {
    #[serde(flatten)]
    pub message: MessageResponse,
    pub folder: Folder,
}

/// All four folders, messages in folder order.
#[derive(Debug, Serialize)]
pub struct MailboxResponse {
    pub inbox: Vec<MessageResponse>,
    pub outbox: Vec<MessageResponse>,
    pub drafts: Vec<MessageResponse>,
    pub trash: Vec<MessageResponse>,
}

impl From<MailboxView> for MailboxResponse {
    fn from(view: MailboxView) -> Self {
        let convert = |messages: Vec<Message>| messages.into_iter().map(Into::into).collect();
        Self {
            inbox: convert(view.inbox),
            outbox: convert(view.outbox),
            drafts: convert(view.drafts),
            trash: convert(view.trash),
        }
    }
}

/// Source and destination of a folder move.
#[derive(Debug, Serialize)]
pub struct MovedResponse {
    pub from: Folder,
    pub to: Folder,
}

impl From<Transition> for MovedResponse {
    fn from(t: Transition) -> Self {
        Self {
            from: t.from,
            to: t.to,
        }
    }
}

/// Result of trash and restore: `moved` is null when nothing moved.
#[derive(Debug, Serialize)]
pub struct FolderChangeResponse {
    pub mailbox: MailboxResponse,
    pub moved: Option<MovedResponse>,
}

impl From<FolderChange> for FolderChangeResponse {
    fn from(change: FolderChange) -> Self {
        Self {
            mailbox: change.mailbox.into(),
            moved: change.moved.map(Into::into),
        }
    }
}

/// Result of a purge: `purged_from` is null when nothing was deleted.
#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub mailbox: MailboxResponse,
    pub purged_from: Option<Folder>,
}

/// Result of a send.
#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub sent: MessageResponse,
    pub reply: MessageResponse,
}

/// Unread inbox messages.
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Liveness probe.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
