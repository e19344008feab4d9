//! Message and mailbox persistence.
//!
//! Both repositories work on a plain connection so that a service can run
//! several calls inside one transaction (`&mut *tx`) or on a pooled
//! connection for reads.

use sqlx::SqliteConnection;

use super::mailbox::Mailbox;
use super::types::{Folder, Message, MessageContent, NewMessage};
use crate::{MailroomError, Result};

const MESSAGE_COLUMNS: &str =
    "id, sender, recipient, subject, body, is_read, is_favorite, origin, created_at, updated_at";

/// Repository for message records.
pub struct MessageRepository;

impl MessageRepository {
    /// Insert a message and return the stored record.
    pub async fn create(conn: &mut SqliteConnection, message: &NewMessage) -> Result<Message> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO messages (sender, recipient, subject, body, origin)
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&message.sender)
        .bind(&message.recipient)
        .bind(&message.subject)
        .bind(&message.body)
        .bind(message.origin.as_str())
        .fetch_one(&mut *conn)
        .await?;

        Self::get_by_id(conn, id)
            .await?
            .ok_or_else(|| MailroomError::NotFound("message".to_string()))
    }

    /// Get a message by ID.
    pub async fn get_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Message>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?");
        let message = sqlx::query_as::<_, Message>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(message)
    }

    /// Replace recipient, subject and body. Returns false if no such message.
    pub async fn update_content(
        conn: &mut SqliteConnection,
        id: i64,
        content: &MessageContent,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE messages
             SET recipient = ?, subject = ?, body = ?, updated_at = datetime('now')
             WHERE id = ?",
        )
        .bind(&content.recipient)
        .bind(&content.subject)
        .bind(&content.body)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Write the read and favorite flags of `message` back to the store.
    pub async fn save_flags(conn: &mut SqliteConnection, message: &Message) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = ?, is_favorite = ?, updated_at = datetime('now')
             WHERE id = ?",
        )
        .bind(message.is_read)
        .bind(message.is_favorite)
        .bind(message.id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a message. Mailbox entries pointing at it cascade.
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// A mailbox with its message records filled in.
#[derive(Debug, Clone, Default)]
pub struct MailboxView {
    pub inbox: Vec<Message>,
    pub outbox: Vec<Message>,
    pub drafts: Vec<Message>,
    pub trash: Vec<Message>,
}

impl MailboxView {
    /// Messages of one folder.
    pub fn folder(&self, folder: Folder) -> &[Message] {
        match folder {
            Folder::Inbox => &self.inbox,
            Folder::Outbox => &self.outbox,
            Folder::Drafts => &self.drafts,
            Folder::Trash => &self.trash,
        }
    }

    fn folder_mut(&mut self, folder: Folder) -> &mut Vec<Message> {
        match folder {
            Folder::Inbox => &mut self.inbox,
            Folder::Outbox => &mut self.outbox,
            Folder::Drafts => &mut self.drafts,
            Folder::Trash => &mut self.trash,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    folder: Folder,
    message_id: i64,
}

#[derive(sqlx::FromRow)]
struct PopulatedRow {
    folder: Folder,
    #[sqlx(flatten)]
    message: Message,
}

/// Repository for per-account folder membership.
pub struct MailboxRepository;

impl MailboxRepository {
    /// Load the folder lists of an account.
    pub async fn load(conn: &mut SqliteConnection, account_id: i64) -> Result<Mailbox> {
        let rows = sqlx::query_as::<_, EntryRow>(
            "SELECT folder, message_id FROM mailbox_entries
             WHERE account_id = ? ORDER BY position, rowid",
        )
        .bind(account_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut mailbox = Mailbox::new(account_id);
        for row in rows {
            mailbox.append(row.folder, row.message_id);
        }
        Ok(mailbox)
    }

    /// Replace the stored folder lists with `mailbox`.
    pub async fn save(conn: &mut SqliteConnection, mailbox: &Mailbox) -> Result<()> {
        sqlx::query("DELETE FROM mailbox_entries WHERE account_id = ?")
            .bind(mailbox.account_id)
            .execute(&mut *conn)
            .await?;

        for (folder, position, message_id) in mailbox.entries() {
            sqlx::query(
                "INSERT INTO mailbox_entries (account_id, message_id, folder, position)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(mailbox.account_id)
            .bind(message_id)
            .bind(folder.as_str())
            .bind(position)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// Append a message to the end of a folder.
    pub async fn append(
        conn: &mut SqliteConnection,
        account_id: i64,
        folder: Folder,
        message_id: i64,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO mailbox_entries (account_id, message_id, folder, position)
             SELECT ?, ?, ?, COALESCE(MAX(position) + 1, 0)
             FROM mailbox_entries WHERE account_id = ? AND folder = ?",
        )
        .bind(account_id)
        .bind(message_id)
        .bind(folder.as_str())
        .bind(account_id)
        .bind(folder.as_str())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Folder of a message within an account's mailbox.
    pub async fn locate(
        conn: &mut SqliteConnection,
        account_id: i64,
        message_id: i64,
    ) -> Result<Option<Folder>> {
        let folder = sqlx::query_scalar::<_, Folder>(
            "SELECT folder FROM mailbox_entries WHERE account_id = ? AND message_id = ?",
        )
        .bind(account_id)
        .bind(message_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(folder)
    }

    /// Load all four folders with message records, in folder order.
    pub async fn load_view(conn: &mut SqliteConnection, account_id: i64) -> Result<MailboxView> {
        let sql = format!(
            "SELECT e.folder AS folder, {} FROM mailbox_entries e
             JOIN messages m ON m.id = e.message_id
             WHERE e.account_id = ? ORDER BY e.position, e.rowid",
            MESSAGE_COLUMNS
                .split(", ")
                .map(|c| format!("m.{c} AS {c}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let rows = sqlx::query_as::<_, PopulatedRow>(&sql)
            .bind(account_id)
            .fetch_all(&mut *conn)
            .await?;

        let mut view = MailboxView::default();
        for row in rows {
            view.folder_mut(row.folder).push(row.message);
        }
        Ok(view)
    }

    /// Number of unread messages in the inbox.
    pub async fn count_unread(conn: &mut SqliteConnection, account_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM mailbox_entries e
             JOIN messages m ON m.id = e.message_id
             WHERE e.account_id = ? AND e.folder = 'inbox' AND m.is_read = 0",
        )
        .bind(account_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(count)
    }
}
