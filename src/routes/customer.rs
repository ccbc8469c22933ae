use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    auth::new_id,
    error::ApiError,
    models::{PresenceRow, UserRow},
    response,
    state::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewInput {
    quality: String,
    feedback: Option<String>,
    recommend: i64,
    reviewer_id: String,
    associated_serviceman: String,
    associated_job: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/review").route(web::post().to(post_review)))
        .service(web::resource("/api/online/servicemen").route(web::get().to(online_servicemen)));
}

async fn post_review(
    state: web::Data<AppState>,
    body: web::Json<ReviewInput>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner();
    if input.quality.trim().is_empty() {
        return Err(ApiError::validation("Quality is required"));
    }

    sqlx::query(
        r#"INSERT INTO reviews
           (id, quality, recommend, feedback, reviewer_id, serviceman_id, booking_id, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(new_id())
    .bind(&input.quality)
    .bind(input.recommend)
    .bind(&input.feedback)
    .bind(&input.reviewer_id)
    .bind(&input.associated_serviceman)
    .bind(&input.associated_job)
    .bind(Utc::now().to_rfc3339())
    .execute(&state.db)
    .await?;

    Ok(response::created_message("Created Successfully"))
}

/// Servicemen currently marked online, resolved to their account records.
async fn online_servicemen(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let online = sqlx::query_as::<_, PresenceRow>(
        "SELECT user_id, is_serviceman, since FROM online_users WHERE is_serviceman = 1",
    )
    .fetch_all(&state.db)
    .await?;

    if online.is_empty() {
        return Err(ApiError::not_found("No service men found"));
    }

    let servicemen = sqlx::query_as::<_, UserRow>(
        r#"SELECT u.id, u.name, u.email, u.phone_number, u.address, u.password_hash,
                  u.is_serviceman, u.is_blocked, u.referral, u.created_at, u.updated_at
           FROM users u
           JOIN online_users o ON o.user_id = u.id
           WHERE o.is_serviceman = 1"#,
    )
    .fetch_all(&state.db)
    .await?;

    let views: Vec<_> = servicemen.into_iter().map(UserRow::into_view).collect();
    Ok(response::ok("Success", views))
}
