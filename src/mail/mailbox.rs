//! Mailbox folder state machine.
//!
//! A mailbox holds four ordered lists of message IDs. A message ID lives in
//! at most one of them. Every operation here is pure: it mutates the lists
//! in memory and reports what moved. Persisting the result is the caller's
//! job (see [`MailboxRepository`](super::MailboxRepository)).

use super::types::{Folder, Message, Transition};

/// Folder membership of one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mailbox {
    /// Owning account.
    pub account_id: i64,
    pub inbox: Vec<i64>,
    pub outbox: Vec<i64>,
    pub drafts: Vec<i64>,
    pub trash: Vec<i64>,
}

/// Scan order of `move_to_trash`.
const TRASHABLE: [Folder; 3] = [Folder::Inbox, Folder::Outbox, Folder::Drafts];

/// Scan order of `purge`.
const PURGEABLE: [Folder; 2] = [Folder::Trash, Folder::Drafts];

impl Mailbox {
    /// Create an empty mailbox.
    pub fn new(account_id: i64) -> Self {
        Self {
            account_id,
            ..Self::default()
        }
    }

    /// IDs in a folder, in order.
    pub fn folder(&self, folder: Folder) -> &[i64] {
        match folder {
            Folder::Inbox => &self.inbox,
            Folder::Outbox => &self.outbox,
            Folder::Drafts => &self.drafts,
            Folder::Trash => &self.trash,
        }
    }

    fn folder_mut(&mut self, folder: Folder) -> &mut Vec<i64> {
        match folder {
            Folder::Inbox => &mut self.inbox,
            Folder::Outbox => &mut self.outbox,
            Folder::Drafts => &mut self.drafts,
            Folder::Trash => &mut self.trash,
        }
    }

    /// Folder currently holding `message_id`.
    pub fn locate(&self, message_id: i64) -> Option<Folder> {
        Folder::ALL
            .into_iter()
            .find(|f| self.folder(*f).contains(&message_id))
    }

    /// Whether any folder holds `message_id`.
    pub fn contains(&self, message_id: i64) -> bool {
        self.locate(message_id).is_some()
    }

    /// Append `message_id` to `folder`.
    ///
    /// Returns false without changing anything if the ID is already filed
    /// somewhere, so a reference never ends up in two folders.
    pub fn append(&mut self, folder: Folder, message_id: i64) -> bool {
        if self.contains(message_id) {
            return false;
        }
        self.folder_mut(folder).push(message_id);
        true
    }

    /// Remove `message_id` from `folder`. Returns whether it was there.
    fn take(&mut self, folder: Folder, message_id: i64) -> bool {
        let list = self.folder_mut(folder);
        match list.iter().position(|id| *id == message_id) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    /// Move a message from inbox, outbox or drafts into trash.
    ///
    /// Folders are scanned in that order and the first hit wins. A message
    /// that is not in one of those three (including one already in trash)
    /// is left alone and `None` is returned.
    pub fn move_to_trash(&mut self, message_id: i64) -> Option<Transition> {
        let from = TRASHABLE
            .into_iter()
            .find(|folder| self.take(*folder, message_id))?;
        self.trash.push(message_id);
        Some(Transition {
            from,
            to: Folder::Trash,
        })
    }

    /// Move a message out of trash to where it belongs.
    ///
    /// `message` must be the record behind `message_id`; `owner_email` is the
    /// account's own address. Returns `None` if the message is not in trash.
    pub fn restore_from_trash(
        &mut self,
        message_id: i64,
        message: &Message,
        owner_email: &str,
    ) -> Option<Transition> {
        if !self.take(Folder::Trash, message_id) {
            return None;
        }
        let to = restore_destination(message, owner_email);
        self.folder_mut(to).push(message_id);
        Some(Transition {
            from: Folder::Trash,
            to,
        })
    }

    /// Drop a message reference from trash, or from drafts if it is not in trash.
    ///
    /// Returns the folder it was removed from. The caller deletes the record
    /// only when this returns `Some`.
    pub fn purge(&mut self, message_id: i64) -> Option<Folder> {
        PURGEABLE
            .into_iter()
            .find(|folder| self.take(*folder, message_id))
    }

    /// `(folder, position, message_id)` for every reference.
    pub fn entries(&self) -> impl Iterator<Item = (Folder, i64, i64)> + '_ {
        Folder::ALL.into_iter().flat_map(move |folder| {
            self.folder(folder)
                .iter()
                .enumerate()
                .map(move |(pos, id)| (folder, pos as i64, *id))
        })
    }
}

/// Folder a trashed message returns to.
///
/// The origin recorded at creation decides. Records without one fall back
/// to content: anything incomplete is a draft, mail from the owner is
/// outgoing, the rest is incoming.
pub fn restore_destination(message: &Message, owner_email: &str) -> Folder {
    match message.origin {
        Some(origin) if origin != Folder::Trash => origin,
        _ => classify_by_content(message, owner_email),
    }
}

/// Content-based fallback classification.
///
/// The owner comparison ignores ASCII case, matching how account emails are looked up.
pub fn classify_by_content(message: &Message, owner_email: &str) -> Folder {
    if message.is_incomplete() {
        Folder::Drafts
    } else if message.sender.eq_ignore_ascii_case(owner_email) {
        Folder::Outbox
    } else {
        Folder::Inbox
    }
}
