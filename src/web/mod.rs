//! HTTP API for Mailroom.
//!
//! JSON endpoints for accounts, mailboxes, messages and drafts, served by axum.
//! Every route except registration, login and `/health` needs a bearer token.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
