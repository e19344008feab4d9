//! Mail service for Mailroom.
//!
//! Each operation loads what it needs, applies the folder state machine and
//! writes the result inside a single transaction. Delivery happens outside
//! any transaction.

use tracing::{error, info, warn};

use crate::auth::validation::validate_email;
use crate::db::{Account, AccountRepository, Database};
use crate::{MailroomError, Result};

use super::delivery::{Envelope, Transport};
use super::repository::{MailboxRepository, MailboxView, MessageRepository};
use super::types::{
    FlagToggle, Folder, Message, MessageContent, NewMessage, Transition, MAX_BODY_LENGTH,
    MAX_SUBJECT_LENGTH,
};

/// Result of a send: the outbox copy and the reply stub filed in the inbox.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub sent: Message,
    pub reply: Message,
}

/// Result of a folder move: the mailbox afterwards and what moved, if anything.
#[derive(Debug, Clone)]
pub struct FolderChange {
    pub mailbox: MailboxView,
    pub moved: Option<Transition>,
}

/// Service for mailbox operations.
pub struct MailService<'a> {
    db: &'a Database,
    transport: &'a dyn Transport,
}

impl<'a> MailService<'a> {
    /// Create a new MailService.
    pub fn new(db: &'a Database, transport: &'a dyn Transport) -> Self {
        Self { db, transport }
    }

    async fn account(&self, account_id: i64) -> Result<Account> {
        AccountRepository::new(self.db.pool())
            .get_by_id(account_id)
            .await?
            .ok_or_else(|| MailroomError::NotFound("account".to_string()))
    }

    /// The account's four folders with message records.
    pub async fn mailbox(&self, account_id: i64) -> Result<MailboxView> {
        let mut conn = self.db.pool().acquire().await?;
        MailboxRepository::load_view(&mut conn, account_id).await
    }

    /// Number of unread messages in the inbox.
    pub async fn unread_count(&self, account_id: i64) -> Result<i64> {
        let mut conn = self.db.pool().acquire().await?;
        MailboxRepository::count_unread(&mut conn, account_id).await
    }

    /// A message filed in the account's mailbox, with its folder.
    ///
    /// Messages belonging to other accounts are reported as not found.
    pub async fn get_message(&self, account_id: i64, message_id: i64) -> Result<(Message, Folder)> {
        let mut conn = self.db.pool().acquire().await?;
        let folder = MailboxRepository::locate(&mut conn, account_id, message_id)
            .await?
            .ok_or_else(|| MailroomError::NotFound("message".to_string()))?;
        let message = MessageRepository::get_by_id(&mut conn, message_id)
            .await?
            .ok_or_else(|| MailroomError::NotFound("message".to_string()))?;
        Ok((message, folder))
    }

    /// Send a message.
    ///
    /// Hands the message to the transport first, then files a copy in the
    /// outbox and a reply stub in the inbox in one transaction. No database
    /// lock is held while the transport runs. If delivery fails nothing is
    /// recorded.
    pub async fn send(&self, account_id: i64, content: &MessageContent) -> Result<SendOutcome> {
        validate_outgoing(content)?;
        let account = self.account(account_id).await?;

        let envelope = Envelope::new(
            &account.email,
            &content.recipient,
            &content.subject,
            &content.body,
        );
        if let Err(e) = self.transport.send(&envelope).await {
            warn!(
                account_id,
                to = %content.recipient,
                transport = self.transport.name(),
                error = %e,
                "Delivery failed, nothing recorded"
            );
            return Err(e);
        }

        let (sent, reply) = self
            .record_sent(account_id, &account.email, content)
            .await
            .map_err(|e| {
                error!(
                    account_id,
                    to = %content.recipient,
                    error = %e,
                    "Message delivered but sent copy could not be recorded"
                );
                e
            })?;

        info!(
            account_id,
            message_id = sent.id,
            reply_id = reply.id,
            to = %content.recipient,
            "Message sent"
        );
        Ok(SendOutcome { sent, reply })
    }

    async fn record_sent(
        &self,
        account_id: i64,
        sender: &str,
        content: &MessageContent,
    ) -> Result<(Message, Message)> {
        let mut tx = self.db.begin().await?;

        let sent =
            MessageRepository::create(&mut tx, &NewMessage::sent_copy(sender, content)).await?;
        let reply =
            MessageRepository::create(&mut tx, &NewMessage::reply_stub(sender, content)).await?;
        MailboxRepository::append(&mut tx, account_id, Folder::Outbox, sent.id).await?;
        MailboxRepository::append(&mut tx, account_id, Folder::Inbox, reply.id).await?;

        tx.commit().await?;
        Ok((sent, reply))
    }

    /// Save a new draft. Any field may be empty.
    pub async fn save_draft(&self, account_id: i64, content: &MessageContent) -> Result<Message> {
        validate_lengths(content)?;
        let account = self.account(account_id).await?;

        let mut tx = self.db.begin().await?;
        let draft =
            MessageRepository::create(&mut tx, &NewMessage::draft(&account.email, content)).await?;
        MailboxRepository::append(&mut tx, account_id, Folder::Drafts, draft.id).await?;
        tx.commit().await?;

        info!(account_id, message_id = draft.id, "Draft saved");
        Ok(draft)
    }

    /// Replace the content of a draft.
    ///
    /// The message must currently be in the account's drafts folder.
    pub async fn update_draft(
        &self,
        account_id: i64,
        message_id: i64,
        content: &MessageContent,
    ) -> Result<Message> {
        validate_lengths(content)?;

        let mut tx = self.db.begin().await?;
        match MailboxRepository::locate(&mut tx, account_id, message_id).await? {
            Some(Folder::Drafts) => {}
            _ => return Err(MailroomError::NotFound("draft".to_string())),
        }
        MessageRepository::update_content(&mut tx, message_id, content).await?;
        let draft = MessageRepository::get_by_id(&mut tx, message_id)
            .await?
            .ok_or_else(|| MailroomError::NotFound("draft".to_string()))?;
        tx.commit().await?;

        info!(account_id, message_id, "Draft updated");
        Ok(draft)
    }

    /// Move a message from inbox, outbox or drafts to trash.
    ///
    /// A message outside those folders is left alone; `moved` is then `None`.
    pub async fn move_to_trash(&self, account_id: i64, message_id: i64) -> Result<FolderChange> {
        let mut tx = self.db.begin().await?;
        let mut mailbox = MailboxRepository::load(&mut tx, account_id).await?;

        let moved = mailbox.move_to_trash(message_id);
        if moved.is_some() {
            MailboxRepository::save(&mut tx, &mailbox).await?;
        }
        let view = MailboxRepository::load_view(&mut tx, account_id).await?;
        tx.commit().await?;

        log_move(account_id, message_id, moved);
        Ok(FolderChange {
            mailbox: view,
            moved,
        })
    }

    /// Move a message out of trash to the folder it belongs in.
    pub async fn restore_from_trash(
        &self,
        account_id: i64,
        message_id: i64,
    ) -> Result<FolderChange> {
        let account = self.account(account_id).await?;

        let mut tx = self.db.begin().await?;
        let mut mailbox = MailboxRepository::load(&mut tx, account_id).await?;

        let mut moved = None;
        if mailbox.folder(Folder::Trash).contains(&message_id) {
            let message = MessageRepository::get_by_id(&mut tx, message_id)
                .await?
                .ok_or_else(|| MailroomError::NotFound("message".to_string()))?;
            moved = mailbox.restore_from_trash(message_id, &message, &account.email);
            MailboxRepository::save(&mut tx, &mailbox).await?;
        }
        let view = MailboxRepository::load_view(&mut tx, account_id).await?;
        tx.commit().await?;

        log_move(account_id, message_id, moved);
        Ok(FolderChange {
            mailbox: view,
            moved,
        })
    }

    /// Permanently delete a message held in trash or drafts.
    ///
    /// Returns the folder it was removed from, or `None` when the message is
    /// not in either; the record is then kept.
    pub async fn purge(&self, account_id: i64, message_id: i64) -> Result<Option<Folder>> {
        let mut tx = self.db.begin().await?;
        let mut mailbox = MailboxRepository::load(&mut tx, account_id).await?;

        let removed = mailbox.purge(message_id);
        if removed.is_some() {
            MailboxRepository::save(&mut tx, &mailbox).await?;
            MessageRepository::delete(&mut tx, message_id).await?;
        }
        tx.commit().await?;

        match removed {
            Some(folder) => info!(account_id, message_id, from = %folder, "Message purged"),
            None => info!(account_id, message_id, "Purge skipped, not in trash or drafts"),
        }
        Ok(removed)
    }

    /// Set `read` or `favorite` on a message in the account's mailbox.
    ///
    /// The property name is checked before anything is read or written.
    pub async fn toggle_property(
        &self,
        account_id: i64,
        message_id: i64,
        property: &str,
        value: bool,
    ) -> Result<Message> {
        let flag = property.parse()?;
        self.apply_toggle(account_id, message_id, FlagToggle { flag, value })
            .await
    }

    /// Apply a toggle command (`read`, `unread`, `favorite`, `unfavorite`).
    pub async fn toggle(&self, account_id: i64, message_id: i64, command: &str) -> Result<Message> {
        let toggle: FlagToggle = command.parse()?;
        self.apply_toggle(account_id, message_id, toggle).await
    }

    async fn apply_toggle(
        &self,
        account_id: i64,
        message_id: i64,
        toggle: FlagToggle,
    ) -> Result<Message> {
        let mut tx = self.db.begin().await?;
        if MailboxRepository::locate(&mut tx, account_id, message_id)
            .await?
            .is_none()
        {
            return Err(MailroomError::NotFound("message".to_string()));
        }

        let mut message = MessageRepository::get_by_id(&mut tx, message_id)
            .await?
            .ok_or_else(|| MailroomError::NotFound("message".to_string()))?;
        message.apply_flag(toggle.flag, toggle.value);
        MessageRepository::save_flags(&mut tx, &message).await?;
        tx.commit().await?;

        info!(
            account_id,
            message_id,
            flag = toggle.flag.as_str(),
            value = toggle.value,
            "Message flag updated"
        );
        Ok(message)
    }
}

fn log_move(account_id: i64, message_id: i64, moved: Option<Transition>) {
    match moved {
        Some(t) => info!(account_id, message_id, from = %t.from, to = %t.to, "Message moved"),
        None => info!(account_id, message_id, "Move skipped, message not in source folders"),
    }
}

/// Checks for a message about to be sent.
fn validate_outgoing(content: &MessageContent) -> Result<()> {
    if content.recipient.trim().is_empty() {
        return Err(MailroomError::Validation("recipient is required".to_string()));
    }
    validate_email(&content.recipient)
        .map_err(|e| MailroomError::Validation(format!("recipient: {e}")))?;
    if content.subject.trim().is_empty() {
        return Err(MailroomError::Validation("subject is required".to_string()));
    }
    if content.body.trim().is_empty() {
        return Err(MailroomError::Validation("body is required".to_string()));
    }
    validate_lengths(content)
}

fn validate_lengths(content: &MessageContent) -> Result<()> {
    if content.subject.chars().count() > MAX_SUBJECT_LENGTH {
        return Err(MailroomError::Validation(format!(
            "subject must be at most {MAX_SUBJECT_LENGTH} characters"
        )));
    }
    if content.body.chars().count() > MAX_BODY_LENGTH {
        return Err(MailroomError::Validation(format!(
            "body must be at most {MAX_BODY_LENGTH} characters"
        )));
    }
    Ok(())
}
