//! Account repository for Mailroom.

use super::account::{Account, NewAccount};
use super::DbPool;
use crate::{MailroomError, Result};

const ACCOUNT_COLUMNS: &str =
    "id, email, password, first_name, middle_name, last_name, profile_picture, created_at";

/// Repository for account CRUD operations.
pub struct AccountRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new AccountRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new account.
    ///
    /// A duplicate email (case-insensitive) is reported as `Conflict`.
    pub async fn create(&self, new_account: &NewAccount) -> Result<Account> {
        let result = sqlx::query(
            "INSERT INTO accounts (email, password, first_name, middle_name, last_name)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new_account.email)
        .bind(&new_account.password)
        .bind(&new_account.first_name)
        .bind(&new_account.middle_name)
        .bind(&new_account.last_name)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                MailroomError::Conflict("email already registered".to_string())
            }
            other => MailroomError::Database(other.to_string()),
        })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| MailroomError::NotFound("account".to_string()))
    }

    /// Get an account by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(account)
    }

    /// Get an account by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ? COLLATE NOCASE");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(email.trim())
            .fetch_optional(self.pool)
            .await?;
        Ok(account)
    }

    /// Check if an email is already registered (case-insensitive).
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = ? COLLATE NOCASE)",
        )
        .bind(email.trim())
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Replace the profile picture. Returns the updated account, or None if not found.
    pub async fn update_profile_picture(&self, id: i64, picture: &str) -> Result<Option<Account>> {
        let result = sqlx::query("UPDATE accounts SET profile_picture = ? WHERE id = ?")
            .bind(picture)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    /// Delete an account. Its mailbox entries go with it.
    ///
    /// Returns true if an account was deleted.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all accounts.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn ada() -> NewAccount {
        NewAccount::new("ada@example.com", "hashed", "Ada", "Lovelace")
    }

    #[tokio::test]
    async fn test_create_account() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());

        let account = repo.create(&ada().with_middle_name("King")).await.unwrap();

        assert_eq!(account.id, 1);
        assert_eq!(account.email, "ada@example.com");
        assert_eq!(account.middle_name.as_deref(), Some("King"));
        assert!(account.profile_picture.is_none());
        assert!(!account.created_at.is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_email_is_conflict() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());

        repo.create(&ada()).await.unwrap();
        let dup = NewAccount::new("ADA@example.com", "hashed", "Other", "Person");
        let result = repo.create(&dup).await;

        assert!(matches!(result, Err(MailroomError::Conflict(_))));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_by_email_case_insensitive() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let created = repo.create(&ada()).await.unwrap();

        let found = repo.get_by_email("Ada@Example.COM").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_email_exists() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());

        assert!(!repo.email_exists("ada@example.com").await.unwrap());
        repo.create(&ada()).await.unwrap();
        assert!(repo.email_exists("ada@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_profile_picture() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let account = repo.create(&ada()).await.unwrap();

        let updated = repo
            .update_profile_picture(account.id, "data:image/png;base64,AAAA")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            updated.profile_picture.as_deref(),
            Some("data:image/png;base64,AAAA")
        );

        assert!(repo
            .update_profile_picture(999, "x")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_account() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());
        let account = repo.create(&ada()).await.unwrap();

        assert!(repo.delete(account.id).await.unwrap());
        assert!(!repo.delete(account.id).await.unwrap());
        assert!(repo.get_by_id(account.id).await.unwrap().is_none());
    }
}
