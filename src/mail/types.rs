//! Message types for Mailroom.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{MailroomError, Result};

/// One of the four folders of a mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Folder {
    Inbox,
    Outbox,
    Drafts,
    Trash,
}

impl Folder {
    /// All folders in display order.
    pub const ALL: [Folder; 4] = [Folder::Inbox, Folder::Outbox, Folder::Drafts, Folder::Trash];

    /// Database and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::Inbox => "inbox",
            Folder::Outbox => "outbox",
            Folder::Drafts => "drafts",
            Folder::Trash => "trash",
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Folder {
    type Err = MailroomError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inbox" => Ok(Folder::Inbox),
            "outbox" => Ok(Folder::Outbox),
            "drafts" => Ok(Folder::Drafts),
            "trash" => Ok(Folder::Trash),
            _ => Err(MailroomError::InvalidTransition(format!("unknown folder: {s}"))),
        }
    }
}

/// A stored message record.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Message {
    /// Message ID.
    pub id: i64,
    /// Sender address.
    pub sender: String,
    /// Recipient address (empty for unfinished drafts).
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Read flag.
    pub is_read: bool,
    /// Favorite flag.
    pub is_favorite: bool,
    /// Folder the message was created into. None for records created without one.
    pub origin: Option<Folder>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub updated_at: String,
}

impl Message {
    /// True when any of recipient, subject or body is empty.
    pub fn is_incomplete(&self) -> bool {
        self.recipient.is_empty() || self.subject.is_empty() || self.body.is_empty()
    }

    /// Set a boolean property by name.
    ///
    /// Only `read` and `favorite` are recognized. Anything else is an
    /// `InvalidTransition` and leaves the message untouched.
    pub fn toggle_property(&mut self, property: &str, value: bool) -> Result<()> {
        let flag: MessageFlag = property.parse()?;
        self.apply_flag(flag, value);
        Ok(())
    }

    /// Set a flag.
    pub fn apply_flag(&mut self, flag: MessageFlag, value: bool) {
        match flag {
            MessageFlag::Read => self.is_read = value,
            MessageFlag::Favorite => self.is_favorite = value,
        }
    }
}

/// Data for creating a new message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    /// Folder the message is created into.
    pub origin: Folder,
}

impl NewMessage {
    /// The copy kept in the sender's outbox.
    pub fn sent_copy(sender: &str, content: &MessageContent) -> Self {
        Self {
            sender: sender.to_string(),
            recipient: content.recipient.clone(),
            subject: content.subject.clone(),
            body: content.body.clone(),
            origin: Folder::Outbox,
        }
    }

    /// The locally synthesized acknowledgement placed in the sender's inbox.
    pub fn reply_stub(sender: &str, content: &MessageContent) -> Self {
        Self {
            sender: content.recipient.clone(),
            recipient: sender.to_string(),
            subject: format!("{REPLY_PREFIX}{}", content.subject),
            body: REPLY_BODY.to_string(),
            origin: Folder::Inbox,
        }
    }

    /// A draft owned by `sender`.
    pub fn draft(sender: &str, content: &MessageContent) -> Self {
        Self {
            sender: sender.to_string(),
            recipient: content.recipient.clone(),
            subject: content.subject.clone(),
            body: content.body.clone(),
            origin: Folder::Drafts,
        }
    }
}

/// Maximum subject length in characters.
pub const MAX_SUBJECT_LENGTH: usize = 255;

/// Maximum body length in characters.
pub const MAX_BODY_LENGTH: usize = 100_000;

/// Subject prefix of reply stubs.
pub const REPLY_PREFIX: &str = "Re: ";

/// Body of reply stubs.
pub const REPLY_BODY: &str = "your email received";

/// User-editable part of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageContent {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl MessageContent {
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Boolean message property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFlag {
    Read,
    Favorite,
}

impl MessageFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFlag::Read => "read",
            MessageFlag::Favorite => "favorite",
        }
    }
}

impl FromStr for MessageFlag {
    type Err = MailroomError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "read" => Ok(MessageFlag::Read),
            "favorite" => Ok(MessageFlag::Favorite),
            _ => Err(MailroomError::InvalidTransition(format!(
                "unknown property: {s}"
            ))),
        }
    }
}

/// A toggle command as exposed over HTTP: `read`, `unread`, `favorite`, `unfavorite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagToggle {
    pub flag: MessageFlag,
    pub value: bool,
}

impl FromStr for FlagToggle {
    type Err = MailroomError;

    fn from_str(s: &str) -> Result<Self> {
        let (flag, value) = match s {
            "read" => (MessageFlag::Read, true),
            "unread" => (MessageFlag::Read, false),
            "favorite" => (MessageFlag::Favorite, true),
            "unfavorite" => (MessageFlag::Favorite, false),
            _ => {
                return Err(MailroomError::InvalidTransition(format!(
                    "unknown toggle command: {s}"
                )))
            }
        };
        Ok(FlagToggle { flag, value })
    }
}

/// A message reference moved between folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Folder,
    pub to: Folder,
}

#[cfg(test)]
pub(crate) fn sample_message(id: i64) -> Message {
    Message {
        id,
        sender: "ada@example.com".to_string(),
        recipient: "bob@example.com".to_string(),
        subject: "Hello".to_string(),
        body: "Hi Bob".to_string(),
        is_read: false,
        is_favorite: false,
        origin: None,
        created_at: "2024-01-01 00:00:00".to_string(),
        updated_at: "2024-01-01 00:00:00".to_string(),
    }
}
