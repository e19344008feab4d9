//! Input validation for Mailroom account registration.

use thiserror::Error;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length of each name part.
pub const MAX_NAME_LENGTH: usize = 50;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Email is empty.
    #[error("email is required")]
    EmailEmpty,

    /// Email is too long.
    #[error("email must be at most {MAX_EMAIL_LENGTH} characters")]
    EmailTooLong,

    /// Email format is invalid.
    #[error("invalid email format")]
    EmailInvalidFormat,

    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    PasswordTooLong,

    /// A required name part is empty.
    #[error("{0} is required")]
    NameEmpty(&'static str),

    /// A name part is too long.
    #[error("{0} must be at most {MAX_NAME_LENGTH} characters")]
    NameTooLong(&'static str),

    /// A name part contains control characters.
    #[error("{0} contains invalid characters")]
    NameInvalidChars(&'static str),
}

/// Validate an email address.
///
/// Only a basic shape check: one `@`, a non-empty local part and a dotted
/// domain without empty labels or whitespace.
///
/// # Examples
///
/// ```
/// use mailroom::auth::validation::validate_email;
///
/// assert!(validate_email("ada@example.com").is_ok());
/// assert!(validate_email("ada@localhost").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailEmpty);
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }
    if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::EmailInvalidFormat);
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(ValidationError::EmailInvalidFormat);
    }
    if domain.split('.').any(|label| label.is_empty()) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}

/// Validate password length (in characters).
pub fn validate_registration_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooLong);
    }
    Ok(())
}

/// Validate one part of a name. `field` names it in the error.
pub fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::NameEmpty(field));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong(field));
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(ValidationError::NameInvalidChars(field));
    }
    Ok(())
}

/// Validate all registration fields, returning the first error.
pub fn validate_registration(
    email: &str,
    password: &str,
    first_name: &str,
    middle_name: Option<&str>,
    last_name: &str,
) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_registration_password(password)?;
    validate_name("first_name", first_name)?;
    if let Some(middle) = middle_name.filter(|m| !m.is_empty()) {
        validate_name("middle_name", middle)?;
    }
    validate_name("last_name", last_name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user.name@example.co.uk").is_ok());
        assert!(validate_email("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_validate_email_invalid_format() {
        for email in [
            "invalid",
            "@example.com",
            "user@",
            "user@example",
            "user@@example.com",
            "user @example.com",
            "user@example..com",
        ] {
            assert_eq!(
                validate_email(email),
                Err(ValidationError::EmailInvalidFormat),
                "{email}"
            );
        }
    }

    #[test]
    fn test_validate_email_empty_and_long() {
        assert_eq!(validate_email(""), Err(ValidationError::EmailEmpty));

        let long_email = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            validate_email(&long_email),
            Err(ValidationError::EmailTooLong)
        );
    }

    #[test]
    fn test_validate_password_lengths() {
        assert_eq!(
            validate_registration_password("1234567"),
            Err(ValidationError::PasswordTooShort)
        );
        assert!(validate_registration_password("12345678").is_ok());
        assert_eq!(
            validate_registration_password(&"a".repeat(129)),
            Err(ValidationError::PasswordTooLong)
        );
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("first_name", "Ada").is_ok());
        assert!(validate_name("first_name", &"é".repeat(50)).is_ok());
        assert_eq!(
            validate_name("first_name", "  "),
            Err(ValidationError::NameEmpty("first_name"))
        );
        assert_eq!(
            validate_name("last_name", &"a".repeat(51)),
            Err(ValidationError::NameTooLong("last_name"))
        );
        assert_eq!(
            validate_name("last_name", "Love\nlace"),
            Err(ValidationError::NameInvalidChars("last_name"))
        );
    }

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration(
            "ada@example.com",
            "password123",
            "Ada",
            None,
            "Lovelace"
        )
        .is_ok());
        assert!(validate_registration(
            "ada@example.com",
            "password123",
            "Ada",
            Some(""),
            "Lovelace"
        )
        .is_ok());
        assert_eq!(
            validate_registration("ada", "password123", "Ada", None, "Lovelace"),
            Err(ValidationError::EmailInvalidFormat)
        );
        assert_eq!(
            validate_registration(
                "ada@example.com",
                "password123",
                "Ada",
                Some(&"m".repeat(51)),
                "Lovelace"
            ),
            Err(ValidationError::NameTooLong("middle_name"))
        );
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            ValidationError::NameEmpty("first_name").to_string(),
            "first_name is required"
        );
        assert!(ValidationError::PasswordTooShort
            .to_string()
            .contains("at least 8"));
    }
}
