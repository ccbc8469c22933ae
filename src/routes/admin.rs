use actix_web::{web, HttpResponse};
use actix_web_httpauth::middleware::HttpAuthentication;
use chrono::Utc;
use serde::Deserialize;

use crate::{
    auth::{admin_validator, hash_password, new_id},
    error::{on_unique_violation, ApiError},
    models::{AdminRow, ServiceRow, ServiceView, UserRow},
    response,
    state::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminInput {
    username: String,
    full_name: String,
    email: String,
    phone: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceInput {
    name: String,
    key_word: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockInput {
    user_id: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .wrap(HttpAuthentication::bearer(admin_validator))
            .service(
                web::resource("/admins")
                    .route(web::post().to(create_admin))
                    .route(web::get().to(list_admins)),
            )
            .service(web::resource("/services").route(web::post().to(add_service)))
            .service(web::resource("/users").route(web::get().to(list_users)))
            .service(web::resource("/block").route(web::post().to(block_user))),
    );
}

async fn create_admin(
    state: web::Data<AppState>,
    body: web::Json<AdminInput>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner();
    for (value, message) in [
        (&input.username, "Username is required"),
        (&input.email, "Email is required"),
        (&input.password, "Password is required"),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::validation(message));
        }
    }

    let password_hash = hash_password(&input.password).map_err(|err| {
        log::error!("password hash failed: {err}");
        ApiError::Internal
    })?;

    let id = new_id();
    sqlx::query(
        r#"INSERT INTO admins (id, username, full_name, email, phone_number, password_hash, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&id)
    .bind(&input.username)
    .bind(&input.full_name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&password_hash)
    .bind(Utc::now().to_rfc3339())
    .execute(&state.db)
    .await
    .map_err(|err| on_unique_violation(err, ApiError::conflict("Email already registered")))?;

    let admin = sqlx::query_as::<_, AdminRow>(
        r#"SELECT id, username, full_name, email, phone_number, password_hash, created_at
           FROM admins WHERE id = ? LIMIT 1"#,
    )
    .bind(&id)
    .fetch_one(&state.db)
    .await?;

    Ok(response::ok("Admin created successfully", admin.into_view()))
}

async fn list_admins(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let admins = sqlx::query_as::<_, AdminRow>(
        r#"SELECT id, username, full_name, email, phone_number, password_hash, created_at
           FROM admins ORDER BY created_at"#,
    )
    .fetch_all(&state.db)
    .await?;

    let views: Vec<_> = admins.into_iter().map(AdminRow::into_view).collect();
    Ok(response::ok("Success", views))
}

/// Catalog names are stored lowercase so lookups stay case-insensitive.
async fn add_service(
    state: web::Data<AppState>,
    body: web::Json<ServiceInput>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner();
    if input.name.trim().is_empty() {
        return Err(ApiError::validation("Service name is required"));
    }

    let id = new_id();
    let service_name = input.name.trim().to_lowercase();
    sqlx::query(
        "INSERT INTO services (id, service_name, service_key, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&service_name)
    .bind(&input.key_word)
    .bind(Utc::now().to_rfc3339())
    .execute(&state.db)
    .await
    .map_err(|err| on_unique_violation(err, ApiError::conflict("Service already exists")))?;

    let service = sqlx::query_as::<_, ServiceRow>(
        "SELECT id, service_name, service_key, created_at FROM services WHERE id = ? LIMIT 1",
    )
    .bind(&id)
    .fetch_one(&state.db)
    .await?;

    Ok(response::ok(
        "Service added successfully",
        ServiceView {
            id: service.id,
            service_name: service.service_name,
            service_key: service.service_key,
            created_at: service.created_at,
            associated_servicemen: Vec::new(),
        },
    ))
}

async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let users = sqlx::query_as::<_, UserRow>(
        r#"SELECT id, name, email, phone_number, address, password_hash, is_serviceman,
                  is_blocked, referral, created_at, updated_at
           FROM users ORDER BY created_at"#,
    )
    .fetch_all(&state.db)
    .await?;

    let views: Vec<_> = users.into_iter().map(UserRow::into_view).collect();
    Ok(response::ok("Success", views))
}

async fn block_user(
    state: web::Data<AppState>,
    body: web::Json<BlockInput>,
) -> Result<HttpResponse, ApiError> {
    let result = sqlx::query("UPDATE users SET is_blocked = 1, updated_at = ? WHERE id = ?")
        .bind(Utc::now().to_rfc3339())
        .bind(&body.user_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(response::ok_message("User blocked successfully"))
}
