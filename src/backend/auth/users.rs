/**
 * User Model and Database Operations
 *
 * This module defines the stored user record, password hashing, and the
 * Postgres implementation of `UserStore`.
 */
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::backend::store::postgres::{conflict_or_database, count, like_pattern};
use crate::backend::store::{PgRepository, StoreResult, UserFilter, UserStore};
use crate::shared::messaging::{PublicUser, UserRef};
use crate::shared::Page;

/// User struct representing a user in the database
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// Username (unique)
    pub username: String,
    /// Mobile number (unique, used to log in)
    pub mobile: String,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    pub avatar: Option<String>,
    pub is_online: bool,
    pub last_seen: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A new offline user
    pub fn new(username: String, mobile: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            mobile,
            password_hash,
            avatar: None,
            is_online: false,
            last_seen: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Client view without the password hash
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            mobile: self.mobile.clone(),
            avatar: self.avatar.clone(),
            is_online: self.is_online,
            last_seen: self.last_seen,
            created_at: self.created_at,
        }
    }

    pub fn user_ref(&self) -> UserRef {
        UserRef {
            id: self.id,
            username: self.username.clone(),
            mobile: self.mobile.clone(),
        }
    }
}

/// Hash a password with bcrypt on the blocking pool
pub async fn hash_password(password: String, cost: u32) -> Result<String, bcrypt::BcryptError> {
    match tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await {
        Ok(result) => result,
        Err(join_err) => {
            tracing::error!("Password hashing task failed: {}", join_err);
            Err(bcrypt::BcryptError::InvalidHash(
                "hashing task failed".to_string(),
            ))
        }
    }
}

/// Check a password against a bcrypt hash; malformed hashes never match
pub async fn verify_password(password: String, hash: String) -> bool {
    match tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await {
        Ok(Ok(valid)) => valid,
        Ok(Err(e)) => {
            tracing::warn!("Stored password hash could not be verified: {}", e);
            false
        }
        Err(join_err) => {
            tracing::error!("Password verification task failed: {}", join_err);
            false
        }
    }
}

const USER_COLUMNS: &str =
    "id, username, mobile, password_hash, avatar, is_online, last_seen, created_at, updated_at";

fn push_user_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = like_pattern(search);
        builder
            .push(" WHERE (username ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR mobile ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait::async_trait]
impl UserStore for PgRepository {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.mobile)
            .bind(&user.password_hash)
            .bind(&user.avatar)
            .bind(user.is_online)
            .bind(user.last_seen)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_or_database(e, "username or mobile already registered"))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_mobile(&self, mobile: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE mobile = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(mobile)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn user_exists(&self, username: &str, mobile: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 OR mobile = $2)",
        )
        .bind(username)
        .bind(mobile)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn set_user_online(&self, id: Uuid, online: bool) -> StoreResult<()> {
        sqlx::query(
            "UPDATE users SET is_online = $1, last_seen = NOW(), updated_at = NOW() WHERE id = $2",
        )
        .bind(online)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_users(&self, filter: &UserFilter, page: Page) -> StoreResult<(Vec<User>, u64)> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_user_filter(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let users = query.build_query_as::<User>().fetch_all(&self.pool).await?;

        let mut total = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_user_filter(&mut total, filter);
        let total: i64 = total.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((users, count(total)))
    }

    async fn count_users(&self, since: Option<DateTime<Utc>>) -> StoreResult<u64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE $1::timestamptz IS NULL OR created_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count(total))
    }
}
