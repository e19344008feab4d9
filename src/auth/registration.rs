//! Account registration and login for Mailroom.

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::validation::{validate_registration, ValidationError};
use crate::auth::{hash_password, verify_password, PasswordError};
use crate::db::{Account, AccountRepository, NewAccount};
use crate::MailroomError;

/// Message returned for every failed login, so callers cannot probe for accounts.
pub const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Registration-specific errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Validation failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Email already registered.
    #[error("email already registered")]
    EmailExists,

    /// Password hashing failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

impl From<RegistrationError> for MailroomError {
    fn from(e: RegistrationError) -> Self {
        match e {
            RegistrationError::Validation(v) => MailroomError::Validation(v.to_string()),
            RegistrationError::EmailExists => {
                MailroomError::Conflict("email already registered".to_string())
            }
            RegistrationError::Password(PasswordError::TooShort | PasswordError::TooLong) => {
                MailroomError::Validation(e.to_string())
            }
            RegistrationError::Password(p) => MailroomError::Database(p.to_string()),
            RegistrationError::Database(msg) => MailroomError::Database(msg),
        }
    }
}

/// Registration request data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            first_name: first_name.into(),
            middle_name: None,
            last_name: last_name.into(),
        }
    }

    /// Set the middle name.
    pub fn with_middle_name(mut self, middle_name: impl Into<String>) -> Self {
        self.middle_name = Some(middle_name.into());
        self
    }
}

/// Register a new account.
///
/// Validates the fields, rejects an email that is already registered
/// (case-insensitive), hashes the password and stores the account.
pub async fn register(
    repo: &AccountRepository<'_>,
    request: RegistrationRequest,
) -> Result<Account, RegistrationError> {
    let email = request.email.trim();
    let middle_name = request.middle_name.as_deref().map(str::trim);

    validate_registration(
        email,
        &request.password,
        request.first_name.trim(),
        middle_name,
        request.last_name.trim(),
    )?;

    if repo
        .email_exists(email)
        .await
        .map_err(|e| RegistrationError::Database(e.to_string()))?
    {
        return Err(RegistrationError::EmailExists);
    }

    let password_hash = hash_password(&request.password)?;

    let mut new_account = NewAccount::new(
        email,
        password_hash,
        request.first_name.trim(),
        request.last_name.trim(),
    );
    if let Some(middle) = middle_name.filter(|m| !m.is_empty()) {
        new_account = new_account.with_middle_name(middle);
    }

    let account = repo.create(&new_account).await.map_err(|e| match e {
        // Lost a race with a concurrent registration.
        MailroomError::Conflict(_) => RegistrationError::EmailExists,
        other => RegistrationError::Database(other.to_string()),
    })?;

    info!(
        account_id = account.id,
        email = %account.email,
        "New account registered"
    );

    Ok(account)
}

/// Check an email and password pair.
///
/// Unknown email and wrong password fail with the same `Auth` error.
pub async fn authenticate(
    repo: &AccountRepository<'_>,
    email: &str,
    password: &str,
) -> crate::Result<Account> {
    let Some(account) = repo.get_by_email(email).await? else {
        warn!(email = %email.trim(), "Login failed: unknown email");
        return Err(MailroomError::Auth(INVALID_CREDENTIALS.to_string()));
    };

    if verify_password(password, &account.password).is_err() {
        warn!(account_id = account.id, "Login failed: wrong password");
        return Err(MailroomError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    info!(account_id = account.id, "Login succeeded");
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn request() -> RegistrationRequest {
        RegistrationRequest::new("ada@example.com", "password123", "Ada", "Lovelace")
    }

    #[tokio::test]
    async fn test_register_success() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = AccountRepository::new(db.pool());

        let account = register(&repo, request().with_middle_name("King"))
            .await
            .unwrap();

        assert_eq!(account.email, "ada@example.com");
        assert_eq!(account.full_name(), "Ada King Lovelace");
        assert!(account.password.starts_with("$argon2id$"));
        assert!(account.profile_picture.is_none());
    }

    #[tokio::test]
    async fn test_register_trims_fields() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = AccountRepository::new(db.pool());

        let account = register(
            &repo,
            RegistrationRequest::new(" ada@example.com ", "password123", " Ada ", "Lovelace")
                .with_middle_name(""),
        )
        .await
        .unwrap();

        assert_eq!(account.email, "ada@example.com");
        assert_eq!(account.first_name, "Ada");
        assert_eq!(account.middle_name, None);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = AccountRepository::new(db.pool());
        register(&repo, request()).await.unwrap();

        let result = register(
            &repo,
            RegistrationRequest::new("ADA@example.com", "password456", "Ada", "Byron"),
        )
        .await;

        assert!(matches!(result, Err(RegistrationError::EmailExists)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_register_invalid_fields() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = AccountRepository::new(db.pool());

        let result = register(
            &repo,
            RegistrationRequest::new("not-an-email", "password123", "Ada", "Lovelace"),
        )
        .await;
        assert!(matches!(result, Err(RegistrationError::Validation(_))));

        let result = register(
            &repo,
            RegistrationRequest::new("ada@example.com", "short", "Ada", "Lovelace"),
        )
        .await;
        assert!(matches!(result, Err(RegistrationError::Validation(_))));

        let result = register(
            &repo,
            RegistrationRequest::new("ada@example.com", "password123", "", "Lovelace"),
        )
        .await;
        assert!(matches!(result, Err(RegistrationError::Validation(_))));

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = AccountRepository::new(db.pool());
        let registered = register(&repo, request()).await.unwrap();

        let account = authenticate(&repo, "Ada@Example.com", "password123")
            .await
            .unwrap();
        assert_eq!(account.id, registered.id);

        let wrong = authenticate(&repo, "ada@example.com", "password124").await;
        let unknown = authenticate(&repo, "bob@example.com", "password123").await;
        match (wrong, unknown) {
            (Err(MailroomError::Auth(a)), Err(MailroomError::Auth(b))) => assert_eq!(a, b),
            other => panic!("expected auth errors, got {other:?}"),
        }
    }

    #[test]
    fn test_registration_error_conversion() {
        assert!(matches!(
            MailroomError::from(RegistrationError::EmailExists),
            MailroomError::Conflict(_)
        ));
        assert!(matches!(
            MailroomError::from(RegistrationError::Validation(
                ValidationError::EmailInvalidFormat
            )),
            MailroomError::Validation(_)
        ));
        assert!(matches!(
            MailroomError::from(RegistrationError::Password(PasswordError::TooShort)),
            MailroomError::Validation(_)
        ));
    }
}
