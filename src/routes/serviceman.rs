use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::{hash_password, issue_session, new_id, verify_password},
    db::{fetch_booking, fetch_user},
    error::{on_unique_violation, ApiError},
    models::{
        AdminRow, ReviewRow, UserRow, STATUS_ACCEPTED, STATUS_CANCELED, SESSION_ADMIN,
        SESSION_USER,
    },
    response,
    state::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignupInput {
    name: String,
    phone: String,
    email: String,
    address: String,
    password: String,
    #[serde(default)]
    selected_services: Vec<ServiceChoice>,
    #[serde(default)]
    is_professional: bool,
}

#[derive(Deserialize)]
struct ServiceChoice {
    name: String,
}

#[derive(Deserialize)]
struct LoginInput {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct IdQuery {
    id: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/signup").route(web::post().to(signup)))
        .service(web::resource("/api/login").route(web::post().to(login)))
        .service(web::resource("/api/booking/confirm").route(web::patch().to(confirm_booking)))
        .service(web::resource("/api/booking/cancel").route(web::patch().to(cancel_booking)))
        .service(web::resource("/api/serviceman").route(web::get().to(serviceman_detail)))
        .service(web::resource("/api/reviews").route(web::get().to(list_reviews)))
        .service(
            web::resource("/api/serviceman/profile")
                .route(web::get().to(profile_stub))
                .route(web::post().to(profile_post_stub)),
        );
}

async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupInput>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner();
    for (value, message) in [
        (&input.name, "Name is required"),
        (&input.phone, "Phone is required"),
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
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"INSERT INTO users
           (id, name, email, phone_number, address, password_hash, is_serviceman,
            is_blocked, referral, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?)"#,
    )
    .bind(&id)
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.address)
    .bind(&password_hash)
    .bind(input.is_professional as i64)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|err| on_unique_violation(err, ApiError::conflict("Email already registered")))?;

    // Attach the new account to each selected catalog entry. Unknown service
    // names are a no-op, matching the signup contract.
    for choice in &input.selected_services {
        sqlx::query(
            r#"INSERT OR IGNORE INTO service_members (service_name, user_id)
               SELECT service_name, ? FROM services WHERE service_name = ?"#,
        )
        .bind(&id)
        .bind(choice.name.to_lowercase())
        .execute(&state.db)
        .await?;
    }

    let token = issue_session(&state.db, &id, SESSION_USER).await?;

    Ok(response::created(
        "Service man created successfully",
        json!({
            "token": token,
            "id": id,
            "isServiceman": input.is_professional,
        }),
    ))
}

/// User accounts are authoritative for a given email; the admin table is only
/// consulted when no user matches.
async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginInput>,
) -> Result<HttpResponse, ApiError> {
    let user = sqlx::query_as::<_, UserRow>(
        r#"SELECT id, name, email, phone_number, address, password_hash, is_serviceman,
                  is_blocked, referral, created_at, updated_at
           FROM users
           WHERE email = ?
           LIMIT 1"#,
    )
    .bind(&body.email)
    .fetch_optional(&state.db)
    .await?;

    if let Some(user) = user {
        if verify_password(&body.password, &user.password_hash) {
            let token = issue_session(&state.db, &user.id, SESSION_USER).await?;
            let mut data = serde_json::to_value(user.into_view())?;
            data["type"] = json!("user");
            data["token"] = json!(token);
            return Ok(response::ok("Login successful", data));
        }
        return Err(ApiError::Unauthorized);
    }

    let admin = sqlx::query_as::<_, AdminRow>(
        r#"SELECT id, username, full_name, email, phone_number, password_hash, created_at
           FROM admins
           WHERE email = ?
           LIMIT 1"#,
    )
    .bind(&body.email)
    .fetch_optional(&state.db)
    .await?;

    if let Some(admin) = admin {
        if verify_password(&body.password, &admin.password_hash) {
            let token = issue_session(&state.db, &admin.id, SESSION_ADMIN).await?;
            let mut data = serde_json::to_value(admin.into_view())?;
            data["type"] = json!("admin");
            data["token"] = json!(token);
            return Ok(response::ok("Login successful", data));
        }
    }

    Err(ApiError::Unauthorized)
}

async fn confirm_booking(
    state: web::Data<AppState>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, ApiError> {
    let result = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
        .bind(STATUS_ACCEPTED)
        .bind(&query.id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::precondition("Booking not found"));
    }

    let booking = fetch_booking(&state.db, &query.id)
        .await?
        .ok_or(ApiError::Internal)?;
    Ok(response::ok(
        "Booking confirmed successfully",
        booking.into_view(),
    ))
}

async fn cancel_booking(
    state: web::Data<AppState>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, ApiError> {
    let result = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
        .bind(STATUS_CANCELED)
        .bind(&query.id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Booking not found"));
    }

    let booking = fetch_booking(&state.db, &query.id)
        .await?
        .ok_or(ApiError::Internal)?;
    Ok(response::ok(
        "Booking canceled successfully",
        booking.into_view(),
    ))
}

async fn serviceman_detail(
    state: web::Data<AppState>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, ApiError> {
    let user = fetch_user(&state.db, &query.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Service man not found"))?;
    Ok(response::ok("Service man found successfully", user.into_view()))
}

/// Reviews written by an account, each joined with the reviewed serviceman
/// and the underlying booking. Dangling references resolve to null rather
/// than failing the whole request.
async fn list_reviews(
    state: web::Data<AppState>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, ApiError> {
    let reviews = sqlx::query_as::<_, ReviewRow>(
        r#"SELECT id, quality, recommend, feedback, reviewer_id, serviceman_id, booking_id, created_at
           FROM reviews
           WHERE reviewer_id = ?
           ORDER BY created_at DESC"#,
    )
    .bind(&query.id)
    .fetch_all(&state.db)
    .await?;

    let mut entries = Vec::with_capacity(reviews.len());
    for review in reviews {
        let serviceman = fetch_user(&state.db, &review.serviceman_id)
            .await?
            .map(UserRow::into_view);
        let booking = fetch_booking(&state.db, &review.booking_id)
            .await?
            .map(|row| row.into_view());
        entries.push(json!({
            "review": review.into_view(),
            "serviceman": serviceman,
            "booking": booking,
        }));
    }

    Ok(response::ok("Reviews fetched successfully", entries))
}

async fn profile_stub() -> HttpResponse {
    response::ok("Profile endpoint", json!({ "key": "profile" }))
}

async fn profile_post_stub() -> HttpResponse {
    response::ok("Profile endpoint", json!({ "key": "profile_post" }))
}
