//! API handlers.

pub mod account;
pub mod mailbox;

pub use account::*;
pub use mailbox::*;

use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use crate::db::Database;
use crate::mail::{MailService, Transport};
use crate::web::error::ApiError;
use crate::web::middleware::JwtClaims;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Outbound delivery.
    pub transport: Arc<dyn Transport>,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token lifetime in seconds.
    pub access_token_expiry: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Database,
        transport: Arc<dyn Transport>,
        jwt_secret: &str,
        access_token_expiry: u64,
    ) -> Self {
        Self {
            db,
            transport,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            access_token_expiry,
        }
    }

    /// Mail service bound to this state.
    pub fn mail(&self) -> MailService<'_> {
        MailService::new(&self.db, self.transport.as_ref())
    }

    /// Generate an access token for an account.
    pub fn generate_access_token(&self, account_id: i64, email: &str) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: account_id,
            email: email.to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }
}
