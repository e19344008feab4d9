//! Database schema and migrations for Mailroom.
//!
//! Migrations are applied in order when the database is opened; the
//! schema_version table records how many have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Accounts
    r#"
CREATE TABLE accounts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    email           TEXT NOT NULL,
    password        TEXT NOT NULL,           -- Argon2id PHC string
    first_name      TEXT NOT NULL,
    middle_name     TEXT,
    last_name       TEXT NOT NULL,
    profile_picture TEXT,                    -- base64 image, usually a data URL
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE UNIQUE INDEX idx_accounts_email_nocase ON accounts(email COLLATE NOCASE);
"#,
    // v2: Message records
    r#"
CREATE TABLE messages (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    sender      TEXT NOT NULL DEFAULT '',
    recipient   TEXT NOT NULL DEFAULT '',
    subject     TEXT NOT NULL DEFAULT '',
    body        TEXT NOT NULL DEFAULT '',
    is_read     INTEGER NOT NULL DEFAULT 0,
    is_favorite INTEGER NOT NULL DEFAULT 0,
    origin      TEXT CHECK (origin IN ('inbox', 'outbox', 'drafts')),
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v3: Per-account folder membership
    r#"
CREATE TABLE mailbox_entries (
    account_id  INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    message_id  INTEGER NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
    folder      TEXT NOT NULL CHECK (folder IN ('inbox', 'outbox', 'drafts', 'trash')),
    position    INTEGER NOT NULL,
    PRIMARY KEY (account_id, message_id)
);

CREATE INDEX idx_mailbox_entries_folder ON mailbox_entries(account_id, folder, position);
CREATE INDEX idx_mailbox_entries_message ON mailbox_entries(message_id);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
        assert!(MIGRATIONS.iter().all(|m| !m.trim().is_empty()));
    }
}
