/**
 * Login Sessions
 *
 * A login session is recorded for every successful login or registration.
 * Its id (`sess_<unix-millis>_<9 base-36 chars>`) travels in the JWT and is
 * the fallback session for messages; chats get their own ids of the same
 * shape so AI conversations stay isolated per chat.
 */
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::types::Json;
use uuid::Uuid;

use crate::backend::store::postgres::conflict_or_database;
use crate::backend::store::{PgRepository, SessionStore, StoreResult};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a session id: `sess_<unix-millis>_<9 random base-36 chars>`
pub fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("sess_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// Stored login session
#[derive(Debug, Clone, PartialEq)]
pub struct LoginSession {
    pub id: Uuid,
    pub session_id: String,
    pub user_id: Uuid,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub is_active: bool,
    pub last_activity: DateTime<Utc>,
    pub login_time: DateTime<Utc>,
    pub logout_time: Option<DateTime<Utc>>,
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl LoginSession {
    /// A new active session with a generated id
    pub fn start(user_id: Uuid, user_agent: Option<String>, ip_address: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            session_id: generate_session_id(),
            user_id,
            user_agent,
            ip_address,
            is_active: true,
            last_activity: now,
            login_time: now,
            logout_time: None,
            metadata: HashMap::new(),
            created_at: now,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LoginSessionRow {
    id: Uuid,
    session_id: String,
    user_id: Uuid,
    user_agent: Option<String>,
    ip_address: Option<String>,
    is_active: bool,
    last_activity: DateTime<Utc>,
    login_time: DateTime<Utc>,
    logout_time: Option<DateTime<Utc>>,
    metadata: Json<HashMap<String, String>>,
    created_at: DateTime<Utc>,
}

impl From<LoginSessionRow> for LoginSession {
    fn from(row: LoginSessionRow) -> Self {
        Self {
            id: row.id,
            session_id: row.session_id,
            user_id: row.user_id,
            user_agent: row.user_agent,
            ip_address: row.ip_address,
            is_active: row.is_active,
            last_activity: row.last_activity,
            login_time: row.login_time,
            logout_time: row.logout_time,
            metadata: row.metadata.0,
            created_at: row.created_at,
        }
    }
}

const SESSION_COLUMNS: &str = "id, session_id, user_id, user_agent, ip_address, is_active, \
     last_activity, login_time, logout_time, metadata, created_at";

#[async_trait::async_trait]
impl SessionStore for PgRepository {
    async fn create_session(&self, session: LoginSession) -> StoreResult<LoginSession> {
        let sql = format!(
            "INSERT INTO login_sessions ({SESSION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {SESSION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, LoginSessionRow>(&sql)
            .bind(session.id)
            .bind(&session.session_id)
            .bind(session.user_id)
            .bind(&session.user_agent)
            .bind(&session.ip_address)
            .bind(session.is_active)
            .bind(session.last_activity)
            .bind(session.login_time)
            .bind(session.logout_time)
            .bind(Json(&session.metadata))
            .bind(session.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_or_database(e, "session id already exists"))?;
        Ok(row.into())
    }

    async fn find_session(&self, session_id: &str) -> StoreResult<Option<LoginSession>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM login_sessions WHERE session_id = $1");
        let row = sqlx::query_as::<_, LoginSessionRow>(&sql)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(LoginSession::from))
    }

    async fn end_session(&self, session_id: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE login_sessions \
             SET is_active = FALSE, logout_time = NOW(), last_activity = NOW() \
             WHERE session_id = $1 AND is_active",
        )
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
