//! Mailroom - a webmail backend.
//!
//! Accounts, per-account mailboxes (inbox, outbox, drafts, trash) and an
//! HTTP API over them, with outbound delivery through SMTP.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mail;
pub mod web;

pub use auth::{
    authenticate, hash_password, register, validate_password, verify_password, AccountProfile,
    PasswordError, RegistrationError, RegistrationRequest, ValidationError,
};
pub use config::Config;
pub use db::{Account, AccountRepository, Database, NewAccount};
pub use error::{MailroomError, Result};
pub use mail::{
    Folder, Mailbox, MailService, MailboxView, Message, MessageContent, Transition, Transport,
};
pub use web::WebServer;
