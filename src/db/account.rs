//! Account model for Mailroom.

/// A registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    /// Unique account ID.
    pub id: i64,
    /// Login email address, also the sender address for outgoing mail.
    pub email: String,
    /// Password hash (Argon2).
    pub password: String,
    /// Given name.
    pub first_name: String,
    /// Middle name (optional).
    pub middle_name: Option<String>,
    /// Family name.
    pub last_name: String,
    /// Profile picture as base64 (optional).
    pub profile_picture: Option<String>,
    /// Account creation timestamp.
    pub created_at: String,
}

impl Account {
    /// Full display name, skipping an empty middle name.
    pub fn full_name(&self) -> String {
        match self.middle_name.as_deref().filter(|m| !m.is_empty()) {
            Some(middle) => format!("{} {} {}", self.first_name, middle, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }

    /// Whether `address` is this account's own address (case-insensitive).
    pub fn owns_address(&self, address: &str) -> bool {
        self.email.eq_ignore_ascii_case(address.trim())
    }
}

/// Data for creating a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Login email address.
    pub email: String,
    /// Password hash (should be pre-hashed with Argon2).
    pub password: String,
    /// Given name.
    pub first_name: String,
    /// Middle name (optional).
    pub middle_name: Option<String>,
    /// Family name.
    pub last_name: String,
}

impl NewAccount {
    /// Create a new account with required fields.
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
