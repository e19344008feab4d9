//! Mailbox module for Mailroom.
//!
//! This module provides:
//! - Per-account folders (inbox, outbox, drafts, trash) and their state machine
//! - Message records and flags
//! - Sending with an outbox copy and an inbox reply stub
//! - Drafts
//! - Outbound delivery through a pluggable transport

mod delivery;
mod mailbox;
mod repository;
mod service;
mod types;

pub use delivery::{
    transport_from_config, Envelope, LogTransport, MemoryTransport, SmtpTransport, Transport,
};
pub use mailbox::{classify_by_content, restore_destination, Mailbox};
pub use repository::{MailboxRepository, MailboxView, MessageRepository};
pub use service::{FolderChange, MailService, SendOutcome};
pub use types::{
    FlagToggle, Folder, Message, MessageContent, MessageFlag, NewMessage, Transition,
    MAX_BODY_LENGTH, MAX_SUBJECT_LENGTH, REPLY_BODY, REPLY_PREFIX,
};
