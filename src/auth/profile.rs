//! Account profile for Mailroom.

use tracing::info;

use crate::db::{Account, AccountRepository};
use crate::{MailroomError, Result};

/// Largest accepted picture payload in bytes (10 MB).
pub const MAX_PICTURE_BYTES: usize = 10 * 1024 * 1024;

/// The public part of an account.
///
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountProfile {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub profile_picture: Option<String>,
    pub created_at: String,
}

impl From<Account> for AccountProfile {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            first_name: account.first_name,
            middle_name: account.middle_name,
            last_name: account.last_name,
            profile_picture: account.profile_picture,
            created_at: account.created_at,
        }
    }
}

/// Load the profile of an account.
pub async fn get_profile(repo: &AccountRepository<'_>, account_id: i64) -> Result<AccountProfile> {
    repo.get_by_id(account_id)
        .await?
        .map(AccountProfile::from)
        .ok_or_else(|| MailroomError::NotFound("account".to_string()))
}

/// Check a picture payload: a base64 string, optionally as an image data URL.
pub fn validate_picture(picture: &str) -> Result<()> {
    if picture.trim().is_empty() {
        return Err(MailroomError::Validation(
            "profile picture is required".to_string(),
        ));
    }
    if picture.len() > MAX_PICTURE_BYTES {
        return Err(MailroomError::Validation(
            "profile picture must be at most 10 MB".to_string(),
        ));
    }

    let data = match picture.strip_prefix("data:") {
        Some(rest) => {
            let Some((media, data)) = rest.split_once(',') else {
                return Err(MailroomError::Validation(
                    "malformed data URL".to_string(),
                ));
            };
            if !media.starts_with("image/") || !media.ends_with(";base64") {
                return Err(MailroomError::Validation(
                    "profile picture must be a base64 image".to_string(),
                ));
            }
            data
        }
        None => picture,
    };

    let is_base64 = data
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=' | b'\r' | b'\n'));
    if !is_base64 {
        return Err(MailroomError::Validation(
            "profile picture must be base64 encoded".to_string(),
        ));
    }
    Ok(())
}

/// Replace the profile picture and return the updated profile.
pub async fn update_profile_picture(
    repo: &AccountRepository<'_>,
    account_id: i64,
    picture: &str,
) -> Result<AccountProfile> {
    validate_picture(picture)?;

    let account = repo
        .update_profile_picture(account_id, picture)
        .await?
        .ok_or_else(|| MailroomError::NotFound("account".to_string()))?;

    info!(account_id, bytes = picture.len(), "Profile picture updated");
    Ok(account.into())
}
