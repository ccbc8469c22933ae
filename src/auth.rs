use actix_web::{
    dev::ServiceRequest, error::ErrorUnauthorized, web, Error, HttpMessage,
};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use rand_core::OsRng;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::state::AppState;

const SESSION_TTL_DAYS: i64 = 30;

/// Admin identity attached to requests inside the admin scope.
#[derive(Clone, Debug)]
pub struct AuthAdmin {
    pub id: String,
    pub username: String,
}

pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Issues a fresh opaque session token for an account. Tokens are random,
/// stored server-side, and expire after [`SESSION_TTL_DAYS`].
pub async fn issue_session(
    pool: &SqlitePool,
    account_id: &str,
    kind: &str,
) -> Result<String, sqlx::Error> {
    let token = new_id();
    let expires_at = (Utc::now() + Duration::days(SESSION_TTL_DAYS)).to_rfc3339();
    sqlx::query("INSERT INTO sessions (token, account_id, kind, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&token)
        .bind(account_id)
        .bind(kind)
        .bind(expires_at)
        .execute(pool)
        .await?;
    Ok(token)
}

pub async fn revoke_sessions(pool: &SqlitePool, account_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE account_id = ?")
        .bind(account_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

async fn authenticate_admin(state: &AppState, token: &str) -> Option<AuthAdmin> {
    let row = sqlx::query_as::<_, (String, String, String)>(
        r#"SELECT s.account_id, s.expires_at, a.username
           FROM sessions s
           JOIN admins a ON a.id = s.account_id
           WHERE s.token = ? AND s.kind = 'admin'
           LIMIT 1"#,
    )
    .bind(token)
    .fetch_optional(&state.db)
    .await
    .ok()??;

    let (account_id, expires_at, username) = row;
    let expires = chrono::DateTime::parse_from_rfc3339(&expires_at).ok()?;
    if expires < Utc::now() {
        return None;
    }

    Some(AuthAdmin {
        id: account_id,
        username,
    })
}

pub async fn admin_validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        return Err((ErrorUnauthorized("Unauthorized"), req));
    };
    match authenticate_admin(state, credentials.token()).await {
        Some(admin) => {
            req.extensions_mut().insert(admin);
            Ok(req)
        }
        None => Err((ErrorUnauthorized("Admin access required"), req)),
    }
}
