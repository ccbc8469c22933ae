use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::{new_id, revoke_sessions},
    db::{fetch_booking, fetch_user},
    error::{on_unique_violation, ApiError},
    models::{BookingRow, ReviewRow, ServiceRow, UserRow, UserView, STATUS_PENDING},
    response,
    state::AppState,
};

#[derive(Deserialize)]
struct ProfileQuery {
    query: String,
}

#[derive(Deserialize)]
struct IdQuery {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryQuery {
    id: String,
    #[serde(default)]
    is_serviceman: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingInput {
    service_name: String,
    associated_serviceman: String,
    associated_customer: String,
    address: String,
    phone_number: String,
    note: Option<String>,
    full_name: String,
    offer_price: String,
    service_date: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactInput {
    user_email: String,
    user_name: String,
    message: String,
}

#[derive(Deserialize)]
struct ForgotPasswordInput {
    phonenumber: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OnlineQuery {
    id: Option<String>,
    #[serde(default)]
    is_service_man: bool,
}

#[derive(Serialize)]
struct HistoryEntry {
    #[serde(flatten)]
    booking: crate::models::BookingView,
    professional: Option<UserView>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/profile").route(web::get().to(get_profile)))
        .service(web::resource("/api/profile/summary").route(web::get().to(profile_summary)))
        .service(
            web::resource("/api/booking")
                .route(web::post().to(create_booking))
                .route(web::delete().to(delete_booking)),
        )
        .service(web::resource("/api/booking/history").route(web::get().to(booking_history)))
        .service(web::resource("/api/contact").route(web::post().to(submit_contact)))
        .service(web::resource("/api/forgot-password").route(web::post().to(forgot_password)))
        .service(web::resource("/api/services").route(web::get().to(list_services)))
        .service(web::resource("/api/services/{service_name}").route(web::get().to(get_service)))
        .service(web::resource("/api/online").route(web::post().to(go_online)))
        .service(web::resource("/api/offline").route(web::post().to(go_offline)))
        .service(web::resource("/api/logout").route(web::post().to(log_out)));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

/// Looks an account up by id when the query is a valid identifier,
/// otherwise by exact name match.
async fn get_profile(
    state: web::Data<AppState>,
    query: web::Query<ProfileQuery>,
) -> Result<HttpResponse, ApiError> {
    let user = if Uuid::parse_str(&query.query).is_ok() {
        fetch_user(&state.db, &query.query).await?
    } else {
        sqlx::query_as::<_, UserRow>(
            r#"SELECT id, name, email, phone_number, address, password_hash, is_serviceman,
                      is_blocked, referral, created_at, updated_at
               FROM users
               WHERE name = ?
               LIMIT 1"#,
        )
        .bind(&query.query)
        .fetch_optional(&state.db)
        .await?
    };

    let user = user.ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(response::ok(
        "User profile retrieved successfully",
        user.into_view(),
    ))
}

/// Aggregate serviceman profile: reviews, booking count and the account
/// record, fetched concurrently. The reads are independent, so ordering
/// does not matter.
async fn profile_summary(
    state: web::Data<AppState>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, ApiError> {
    let reviews_fut = sqlx::query_as::<_, ReviewRow>(
        r#"SELECT id, quality, recommend, feedback, reviewer_id, serviceman_id, booking_id, created_at
           FROM reviews
           WHERE serviceman_id = ?"#,
    )
    .bind(&query.id)
    .fetch_all(&state.db);

    let jobs_fut = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM bookings WHERE serviceman_id = ? OR customer_id = ?",
    )
    .bind(&query.id)
    .bind(&query.id)
    .fetch_one(&state.db);

    let user_fut = fetch_user(&state.db, &query.id);

    let (reviews, number_of_jobs, user) = tokio::join!(reviews_fut, jobs_fut, user_fut);
    let reviews: Vec<_> = reviews?.into_iter().map(ReviewRow::into_view).collect();
    let number_of_jobs = number_of_jobs?;
    let user_data = user?.map(UserRow::into_view);

    Ok(response::ok(
        "Profile data found",
        json!({
            "reviews": reviews,
            "numberOfJobs": number_of_jobs,
            "userData": user_data,
            "numberOfReviews": reviews.len(),
        }),
    ))
}

async fn create_booking(
    state: web::Data<AppState>,
    body: web::Json<BookingInput>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner();
    for (value, message) in [
        (&input.service_name, "Service name is required"),
        (&input.associated_serviceman, "Serviceman is required"),
        (&input.associated_customer, "Customer is required"),
        (&input.address, "Address is required"),
        (&input.full_name, "Full name is required"),
        (&input.service_date, "Service date is required"),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::validation(message));
        }
    }

    let price: i64 = input
        .offer_price
        .trim()
        .parse()
        .map_err(|_| ApiError::validation("Offer price must be a number"))?;
    let contact_number: i64 = input
        .phone_number
        .trim()
        .parse()
        .map_err(|_| ApiError::validation("Phone number must be a number"))?;

    let id = new_id();
    sqlx::query(
        r#"INSERT INTO bookings
           (id, service_name, customer_id, serviceman_id, customer_name, address,
            contact_number, note, price, status, booked_at, appointment_date)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&id)
    .bind(&input.service_name)
    .bind(&input.associated_customer)
    .bind(&input.associated_serviceman)
    .bind(&input.full_name)
    .bind(&input.address)
    .bind(contact_number)
    .bind(&input.note)
    .bind(price)
    .bind(STATUS_PENDING)
    .bind(Utc::now().to_rfc3339())
    .bind(&input.service_date)
    .execute(&state.db)
    .await
    .map_err(|err| on_unique_violation(err, ApiError::precondition("Entry already exists")))?;

    let booking = fetch_booking(&state.db, &id)
        .await?
        .ok_or(ApiError::Internal)?;

    Ok(response::ok(
        "History created successfully",
        booking.into_view(),
    ))
}

/// Customer history lists bookings the account requested; serviceman history
/// also includes bookings where the account is the assigned professional.
async fn booking_history(
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, ApiError> {
    let rows = if query.is_serviceman {
        sqlx::query_as::<_, BookingRow>(
            r#"SELECT id, service_name, customer_id, serviceman_id, customer_name, address,
                      contact_number, note, price, status, booked_at, appointment_date
               FROM bookings
               WHERE serviceman_id = ? OR customer_id = ?
               ORDER BY booked_at DESC"#,
        )
        .bind(&query.id)
        .bind(&query.id)
        .fetch_all(&state.db)
        .await?
    } else {
        sqlx::query_as::<_, BookingRow>(
            r#"SELECT id, service_name, customer_id, serviceman_id, customer_name, address,
                      contact_number, note, price, status, booked_at, appointment_date
               FROM bookings
               WHERE customer_id = ?
               ORDER BY booked_at DESC"#,
        )
        .bind(&query.id)
        .fetch_all(&state.db)
        .await?
    };

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let professional = fetch_user(&state.db, &row.serviceman_id)
            .await?
            .map(UserRow::into_view);
        entries.push(HistoryEntry {
            booking: row.into_view(),
            professional,
        });
    }

    Ok(response::ok("History retrieved successfully", entries))
}

async fn delete_booking(
    state: web::Data<AppState>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, ApiError> {
    let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
        .bind(&query.id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Booking not found"));
    }
    Ok(response::ok_message("Booking deleted successfully"))
}

async fn submit_contact(
    state: web::Data<AppState>,
    body: web::Json<ContactInput>,
) -> Result<HttpResponse, ApiError> {
    sqlx::query("INSERT INTO contacts (id, email, name, message, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(new_id())
        .bind(&body.user_email)
        .bind(&body.user_name)
        .bind(&body.message)
        .bind(Utc::now().to_rfc3339())
        .execute(&state.db)
        .await?;
    Ok(response::ok_message("Contact form submitted successfully"))
}

async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordInput>,
) -> Result<HttpResponse, ApiError> {
    let user = sqlx::query_as::<_, (String,)>("SELECT id FROM users WHERE phone_number = ? LIMIT 1")
        .bind(&body.phonenumber)
        .fetch_optional(&state.db)
        .await?;
    if user.is_none() {
        return Err(ApiError::not_found("User not found"));
    }
    // TODO: issue a reset code once an SMS provider is wired up.
    Ok(response::ok_message("Phone number found"))
}

async fn list_services(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let services = sqlx::query_as::<_, ServiceRow>(
        "SELECT id, service_name, service_key, created_at FROM services ORDER BY service_name",
    )
    .fetch_all(&state.db)
    .await?;

    let mut views = Vec::with_capacity(services.len());
    for service in services {
        let members = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM service_members WHERE service_name = ?",
        )
        .bind(&service.service_name)
        .fetch_all(&state.db)
        .await?;
        views.push(crate::models::ServiceView {
            id: service.id,
            service_name: service.service_name,
            service_key: service.service_key,
            created_at: service.created_at,
            associated_servicemen: members,
        });
    }

    Ok(response::ok("All services retrieved successfully", views))
}

async fn get_service(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let service_name = path.into_inner().to_lowercase();
    let service = sqlx::query_as::<_, ServiceRow>(
        "SELECT id, service_name, service_key, created_at FROM services WHERE service_name = ? LIMIT 1",
    )
    .bind(&service_name)
    .fetch_optional(&state.db)
    .await?;

    if service.is_none() {
        return Err(ApiError::not_found("Service not found"));
    }

    let servicemen = sqlx::query_as::<_, UserRow>(
        r#"SELECT u.id, u.name, u.email, u.phone_number, u.address, u.password_hash,
                  u.is_serviceman, u.is_blocked, u.referral, u.created_at, u.updated_at
           FROM users u
           JOIN service_members m ON m.user_id = u.id
           WHERE m.service_name = ?"#,
    )
    .bind(&service_name)
    .fetch_all(&state.db)
    .await?;

    let views: Vec<_> = servicemen.into_iter().map(UserRow::into_view).collect();
    Ok(response::ok("Servicemen found", views))
}

async fn go_online(
    state: web::Data<AppState>,
    query: web::Query<OnlineQuery>,
) -> Result<HttpResponse, ApiError> {
    let id = query
        .id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Missing id parameter"))?;

    sqlx::query("INSERT INTO online_users (user_id, is_serviceman, since) VALUES (?, ?, ?)")
        .bind(id)
        .bind(query.is_service_man as i64)
        .bind(Utc::now().to_rfc3339())
        .execute(&state.db)
        .await
        .map_err(|err| on_unique_violation(err, ApiError::precondition("User is already online")))?;

    Ok(response::ok_message("User marked as online"))
}

async fn go_offline(
    state: web::Data<AppState>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, ApiError> {
    remove_presence(&state, &query.id).await?;
    Ok(response::ok_message("User marked as offline"))
}

/// Same presence removal as going offline, but also revokes the account's
/// sessions so the two operations stay distinguishable server-side.
async fn log_out(
    state: web::Data<AppState>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, ApiError> {
    remove_presence(&state, &query.id).await?;
    revoke_sessions(&state.db, &query.id).await?;
    Ok(response::ok_message("User logged out successfully"))
}

async fn remove_presence(state: &AppState, user_id: &str) -> Result<(), ApiError> {
    let result = sqlx::query("DELETE FROM online_users WHERE user_id = ?")
        .bind(user_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(())
}
