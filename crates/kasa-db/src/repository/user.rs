//! # User Repository
//!
//! Back-office user accounts. Password hashes are opaque strings here;
//! hashing and verification live in the server's auth module.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kasa_core::{Role, User};

/// Columns selected for [`User`] rows.
const USER_COLUMNS: &str =
    "id, branch_id, email, password_hash, display_name, role, is_active, created_at, updated_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets an active user by email (the login lookup).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1 AND is_active = 1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Lists a branch's users.
    pub async fn list(&self, branch_id: &str) -> DbResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE branch_id = ?1
             ORDER BY display_name"
        );

        let users = sqlx::query_as::<_, User>(&sql)
            .bind(branch_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Inserts a new user.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - email already registered
    pub async fn insert(&self, user: &User) -> DbResult<User> {
        debug!(email = %user.email, role = ?user.role, "Inserting user");

        sqlx::query(
            "INSERT INTO users (
                id, branch_id, email, password_hash, display_name,
                role, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&user.id)
        .bind(&user.branch_id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(user.clone())
    }

    /// Deactivates a user (soft delete; logins stop immediately).
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query("UPDATE users SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Counts users with the given role (used to guarantee one admin
    /// always exists before a deactivation).
    pub async fn count_active_with_role(&self, role: Role) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?1 AND is_active = 1")
                .bind(role)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Helper to generate a new user ID.
pub fn generate_user_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kasa_core::DEFAULT_BRANCH_ID;

    fn user(email: &str, role: Role) -> User {
        let now = Utc::now();
        User {
            id: generate_user_id(),
            branch_id: DEFAULT_BRANCH_ID.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            display_name: "Test User".to_string(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;
        let repo = db.users();

        let u = user("patron@kasa.dev", Role::Admin);
        repo.insert(&u).await.unwrap();

        let fetched = repo.get_by_email("patron@kasa.dev").await.unwrap().unwrap();
        assert_eq!(fetched.role, Role::Admin);

        assert_eq!(repo.count_active_with_role(Role::Admin).await.unwrap(), 1);
        assert_eq!(repo.count_active_with_role(Role::Cashier).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_db().await;
        let repo = db.users();

        repo.insert(&user("a@kasa.dev", Role::Cashier)).await.unwrap();
        let err = repo
            .insert(&user("a@kasa.dev", Role::Manager))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_deactivated_user_cannot_login() {
        let db = test_db().await;
        let repo = db.users();

        let u = user("kasiyer@kasa.dev", Role::Cashier);
        repo.insert(&u).await.unwrap();
        repo.deactivate(&u.id).await.unwrap();

        assert!(repo.get_by_email("kasiyer@kasa.dev").await.unwrap().is_none());
        // Still present by ID for audit
        assert!(repo.get_by_id(&u.id).await.unwrap().is_some());
    }
}
